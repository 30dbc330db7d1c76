//! Application-wide error types.

use platforms_status::ProviderError;
use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseSqlx(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Status provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The notification sink rejected or failed a request.
    #[error("Notification error: {0}")]
    Notification(String),

    /// A notification could not be published for a channel going live.
    #[error("Failed to publish notification for {channel}: {reason}")]
    NotificationFailed { channel: String, reason: String },

    #[error("Timed out after {secs}s: {operation}")]
    Timeout { operation: String, secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    pub fn timeout(operation: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs: after.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::not_found("Channel", "abc").to_string(),
            "Entity not found: Channel with id abc"
        );
        assert_eq!(
            Error::timeout("status query for alice", Duration::from_secs(10)).to_string(),
            "Timed out after 10s: status query for alice"
        );
        let err: Error = ProviderError::MissingCredentials("YouTube API key").into();
        assert_eq!(
            err.to_string(),
            "Status provider error: YouTube API key not configured"
        );
    }
}
