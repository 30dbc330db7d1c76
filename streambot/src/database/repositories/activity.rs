//! Activity log repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::ActivityLogDbModel;
use crate::domain::ActivityEvent;

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn insert(&self, event: &ActivityEvent) -> Result<()>;
    /// Most recent events, newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityEvent>>;
    /// Delete every event, returning how many were removed.
    async fn clear(&self) -> Result<u64>;
    /// Keep only the newest `keep` events, returning how many were evicted.
    async fn trim(&self, keep: u32) -> Result<u64>;
}

/// SQLx implementation of ActivityRepository.
pub struct SqlxActivityRepository {
    pool: SqlitePool,
}

impl SqlxActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for SqlxActivityRepository {
    async fn insert(&self, event: &ActivityEvent) -> Result<()> {
        let row = ActivityLogDbModel::from(event);
        sqlx::query(
            "INSERT INTO activity_logs (id, kind, message, details, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.kind)
        .bind(&row.message)
        .bind(&row.details)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ActivityEvent>> {
        // rowid breaks ties between events logged in the same millisecond.
        let rows = sqlx::query_as::<_, ActivityLogDbModel>(
            r#"
            SELECT id, kind, message, details, created_at FROM activity_logs
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ActivityEvent::try_from).collect()
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM activity_logs")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn trim(&self, keep: u32) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM activity_logs WHERE rowid NOT IN (
                SELECT rowid FROM activity_logs
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?
            )
            "#,
        )
        .bind(i64::from(keep))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
