//! Process configuration read from the environment.

use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:streambot.db?mode=rwc";
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Timeout applied to each status query and sink call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Status queries allowed in flight at once during a cycle.
pub const DEFAULT_MAX_CONCURRENT_CHECKS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub log_dir: String,
    pub request_timeout: Duration,
    pub max_concurrent_checks: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent_checks: DEFAULT_MAX_CONCURRENT_CHECKS,
        }
    }
}

impl AppConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `DATABASE_URL`
    /// - `LOG_DIR`
    /// - `STREAMBOT_REQUEST_TIMEOUT_SECS`
    /// - `STREAMBOT_MAX_CONCURRENT_CHECKS`
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL")
            && !url.trim().is_empty()
        {
            config.database_url = url;
        }

        if let Some(dir) = lookup("LOG_DIR")
            && !dir.trim().is_empty()
        {
            config.log_dir = dir;
        }

        if let Some(secs) = lookup("STREAMBOT_REQUEST_TIMEOUT_SECS")
            && let Ok(parsed) = secs.trim().parse::<u64>()
            && parsed > 0
        {
            config.request_timeout = Duration::from_secs(parsed);
        }

        if let Some(max) = lookup("STREAMBOT_MAX_CONCURRENT_CHECKS")
            && let Ok(parsed) = max.trim().parse::<usize>()
            && parsed > 0
        {
            config.max_concurrent_checks = parsed;
        }

        config
    }
}
