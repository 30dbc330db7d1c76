//! Notification ledger: outstanding messages per channel.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::NotificationDbModel;
use crate::domain::NotificationRecord;
use crate::{Error, Result};

#[async_trait]
pub trait NotificationLedger: Send + Sync {
    /// Outstanding records of one channel, oldest first.
    async fn list_for(&self, channel_id: &str) -> Result<Vec<NotificationRecord>>;
    /// Every outstanding record, newest first.
    async fn list_all(&self) -> Result<Vec<NotificationRecord>>;
    async fn insert(&self, record: &NotificationRecord) -> Result<()>;
    async fn remove_by_id(&self, id: &str) -> Result<()>;
}

/// SQLx implementation of NotificationLedger.
pub struct SqlxNotificationLedger {
    pool: SqlitePool,
}

impl SqlxNotificationLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLedger for SqlxNotificationLedger {
    async fn list_for(&self, channel_id: &str) -> Result<Vec<NotificationRecord>> {
        let rows = sqlx::query_as::<_, NotificationDbModel>(
            "SELECT * FROM notifications WHERE channel_id = ? ORDER BY created_at, id",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<NotificationRecord>> {
        let rows = sqlx::query_as::<_, NotificationDbModel>(
            "SELECT * FROM notifications ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, record: &NotificationRecord) -> Result<()> {
        let row = NotificationDbModel::from(record);
        sqlx::query(
            r#"
            INSERT INTO notifications (id, channel_id, destination_id, message_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.channel_id)
        .bind(&row.destination_id)
        .bind(&row.message_id)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_by_id(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Notification", id));
        }
        Ok(())
    }
}
