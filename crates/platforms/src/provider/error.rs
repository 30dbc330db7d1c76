use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid channel url: {0}")]
    InvalidUrl(String),
    #[error("{0} not configured")]
    MissingCredentials(&'static str),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("api error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("other: {0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::MissingCredentials("Twitch API credentials");
        assert_eq!(err.to_string(), "Twitch API credentials not configured");

        let err = ProviderError::ApiError {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!ProviderError::ChannelNotFound("bob".into()).is_transient());
    }
}
