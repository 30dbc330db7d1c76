//! Bot configuration repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::BotConfigDbModel;
use crate::database::time::now_ms;
use crate::domain::BotConfiguration;

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// The stored configuration, or `None` before the first save.
    async fn load(&self) -> Result<Option<BotConfiguration>>;
    async fn save(&self, config: &BotConfiguration) -> Result<()>;
}

/// SQLx implementation of ConfigRepository.
pub struct SqlxConfigRepository {
    pool: SqlitePool,
}

impl SqlxConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigRepository for SqlxConfigRepository {
    async fn load(&self) -> Result<Option<BotConfiguration>> {
        let row = sqlx::query_as::<_, BotConfigDbModel>(
            r#"
            SELECT check_interval_secs, default_message, discord_bot_token,
                   discord_channel_id, discord_server_id, twitch_client_id,
                   twitch_client_secret, youtube_api_key
            FROM bot_config WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn save(&self, config: &BotConfiguration) -> Result<()> {
        let row = BotConfigDbModel::from(config);
        sqlx::query(
            r#"
            INSERT INTO bot_config (
                id, check_interval_secs, default_message, discord_bot_token,
                discord_channel_id, discord_server_id, twitch_client_id,
                twitch_client_secret, youtube_api_key, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                check_interval_secs = excluded.check_interval_secs,
                default_message = excluded.default_message,
                discord_bot_token = excluded.discord_bot_token,
                discord_channel_id = excluded.discord_channel_id,
                discord_server_id = excluded.discord_server_id,
                twitch_client_id = excluded.twitch_client_id,
                twitch_client_secret = excluded.twitch_client_secret,
                youtube_api_key = excluded.youtube_api_key,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(row.check_interval_secs)
        .bind(&row.default_message)
        .bind(&row.discord_bot_token)
        .bind(&row.discord_channel_id)
        .bind(&row.discord_server_id)
        .bind(&row.twitch_client_id)
        .bind(&row.twitch_client_secret)
        .bind(&row.youtube_api_key)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
