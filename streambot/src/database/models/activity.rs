//! Activity log database model.

use std::str::FromStr;

use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::domain::{ActivityEvent, ActivityKind};
use crate::{Error, Result};

#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogDbModel {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub details: Option<String>,
    pub created_at: i64,
}

impl From<&ActivityEvent> for ActivityLogDbModel {
    fn from(event: &ActivityEvent) -> Self {
        Self {
            id: event.id.clone(),
            kind: event.kind.to_string(),
            message: event.message.clone(),
            details: event.details.clone(),
            created_at: datetime_to_ms(event.created_at),
        }
    }
}

impl TryFrom<ActivityLogDbModel> for ActivityEvent {
    type Error = Error;

    fn try_from(row: ActivityLogDbModel) -> Result<Self> {
        let kind = ActivityKind::from_str(&row.kind)
            .map_err(|_| Error::Other(format!("unknown activity kind '{}'", row.kind)))?;
        Ok(Self {
            id: row.id,
            kind,
            message: row.message,
            details: row.details,
            created_at: ms_to_datetime(row.created_at),
        })
    }
}
