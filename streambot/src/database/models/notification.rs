//! Notification ledger database model.

use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::domain::NotificationRecord;

#[derive(Debug, Clone, FromRow)]
pub struct NotificationDbModel {
    pub id: String,
    pub channel_id: String,
    pub destination_id: String,
    pub message_id: String,
    pub created_at: i64,
}

impl From<&NotificationRecord> for NotificationDbModel {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            id: record.id.clone(),
            channel_id: record.channel_id.clone(),
            destination_id: record.destination_id.clone(),
            message_id: record.message_id.clone(),
            created_at: datetime_to_ms(record.created_at),
        }
    }
}

impl From<NotificationDbModel> for NotificationRecord {
    fn from(row: NotificationDbModel) -> Self {
        Self {
            id: row.id,
            channel_id: row.channel_id,
            destination_id: row.destination_id,
            message_id: row.message_id,
            created_at: ms_to_datetime(row.created_at),
        }
    }
}
