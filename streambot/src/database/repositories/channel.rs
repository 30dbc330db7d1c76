//! Channel registry.

use async_trait::async_trait;
use platforms_status::Platform;
use sqlx::SqlitePool;

use crate::database::models::ChannelDbModel;
use crate::database::time::{datetime_to_ms, now_ms};
use crate::domain::{Channel, StatusUpdate};
use crate::{Error, Result};

/// Monitored channels and their last known status.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// All channels, oldest first.
    async fn list(&self) -> Result<Vec<Channel>>;
    async fn get(&self, id: &str) -> Result<Channel>;
    /// Look up a channel by platform and case-insensitive username.
    async fn get_by_identity(&self, platform: Platform, username: &str) -> Result<Option<Channel>>;
    /// Insert a channel; fails with `Conflict` if the identity exists.
    async fn create(&self, channel: &Channel) -> Result<()>;
    async fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// SQLx implementation of ChannelRepository.
pub struct SqlxChannelRepository {
    pool: SqlitePool,
}

impl SqlxChannelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for SqlxChannelRepository {
    async fn list(&self) -> Result<Vec<Channel>> {
        let rows = sqlx::query_as::<_, ChannelDbModel>(
            "SELECT * FROM channels ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Channel::try_from).collect()
    }

    async fn get(&self, id: &str) -> Result<Channel> {
        sqlx::query_as::<_, ChannelDbModel>("SELECT * FROM channels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Channel", id))?
            .try_into()
    }

    async fn get_by_identity(&self, platform: Platform, username: &str) -> Result<Option<Channel>> {
        sqlx::query_as::<_, ChannelDbModel>(
            "SELECT * FROM channels WHERE platform = ? AND username = ?",
        )
        .bind(platform.as_ref())
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(Channel::try_from)
        .transpose()
    }

    async fn create(&self, channel: &Channel) -> Result<()> {
        let row = ChannelDbModel::from_domain(channel, now_ms());
        let result = sqlx::query(
            r#"
            INSERT INTO channels (
                id, platform, username, display_name, custom_message,
                is_live, last_live_at, viewer_count, category, stream_title,
                thumbnail_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.platform)
        .bind(&row.username)
        .bind(&row.display_name)
        .bind(&row.custom_message)
        .bind(row.is_live)
        .bind(row.last_live_at)
        .bind(row.viewer_count)
        .bind(&row.category)
        .bind(&row.stream_title)
        .bind(&row.thumbnail_url)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::conflict(format!(
                    "{} channel '{}' is already registered",
                    channel.platform.display_name(),
                    channel.username
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_status(&self, id: &str, update: &StatusUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE channels SET
                is_live = ?,
                viewer_count = ?,
                category = ?,
                stream_title = ?,
                thumbnail_url = ?,
                last_live_at = COALESCE(?, last_live_at),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.is_live)
        .bind(i64::try_from(update.viewer_count).unwrap_or(i64::MAX))
        .bind(&update.category)
        .bind(&update.stream_title)
        .bind(&update.thumbnail_url)
        .bind(update.last_live_at.map(datetime_to_ms))
        .bind(now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Channel", id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Channel", id));
        }
        Ok(())
    }
}
