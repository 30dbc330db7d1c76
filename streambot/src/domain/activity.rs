//! Activity events: the user-facing audit trail of what the bot did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of an activity event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    pub kind: ActivityKind,
    pub message: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            details,
            created_at: Utc::now(),
        }
    }
}
