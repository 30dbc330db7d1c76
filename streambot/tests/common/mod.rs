//! Shared fixtures for integration tests: an in-memory database and fake
//! status providers and notification sink.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use platforms_status::{Platform, ProviderCredentials, ProviderError, StatusProvider, StreamStatus};

use streambot::config::AppConfig;
use streambot::database::{DbPool, init_pool_with_size, run_migrations};
use streambot::domain::{Channel, ConfigurationUpdate, NewChannel};
use streambot::monitor::StatusSources;
use streambot::notification::{DeleteOutcome, DiscordSink, NotificationSink, OutgoingMessage};
use streambot::services::ServiceContainer;
use streambot::{Error, Result};

pub const DESTINATION: &str = "900000000000000001";

/// Create an in-memory pool with migrations applied.
pub async fn setup_test_db() -> DbPool {
    let pool = init_pool_with_size("sqlite::memory:", 1)
        .await
        .expect("Failed to create test pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Status provider answering from a script.
pub struct FakeProvider {
    platform: Platform,
    statuses: Mutex<HashMap<String, std::result::Result<StreamStatus, String>>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    credentials: Mutex<Option<ProviderCredentials>>,
}

impl FakeProvider {
    pub fn new(platform: Platform) -> Arc<Self> {
        Arc::new(Self {
            platform,
            statuses: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            credentials: Mutex::new(None),
        })
    }

    pub fn set_live(&self, username: &str, title: &str, viewers: u64) {
        let status = StreamStatus::live()
            .title(title)
            .category("Just Chatting")
            .viewer_count(viewers)
            .thumbnail_url("https://cdn.example/thumb-320x180.jpg")
            .build();
        self.statuses.lock().insert(username.to_string(), Ok(status));
    }

    pub fn set_offline(&self, username: &str) {
        self.statuses
            .lock()
            .insert(username.to_string(), Ok(StreamStatus::offline()));
    }

    pub fn set_error(&self, username: &str, message: &str) {
        self.statuses
            .lock()
            .insert(username.to_string(), Err(message.to_string()));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Option<ProviderCredentials> {
        self.credentials.lock().clone()
    }
}

#[async_trait]
impl StatusProvider for FakeProvider {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn configure(&self, credentials: &ProviderCredentials) {
        *self.credentials.lock() = Some(credentials.clone());
    }

    async fn query(&self, username: &str) -> std::result::Result<StreamStatus, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let answer = self
            .statuses
            .lock()
            .get(username)
            .cloned()
            .unwrap_or_else(|| Ok(StreamStatus::offline()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        answer.map_err(ProviderError::Other)
    }
}

/// A message the fake sink accepted.
#[derive(Debug, Clone)]
pub struct Published {
    pub destination: String,
    pub message_id: String,
    pub content: String,
    pub title: String,
}

/// Notification sink keeping messages in memory.
#[derive(Default)]
pub struct FakeSink {
    next_id: AtomicU64,
    published: Mutex<Vec<Published>>,
    deleted: Mutex<Vec<String>>,
    /// Messages currently visible at the destination.
    visible: Mutex<HashSet<String>>,
    pub fail_publish: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Applied before every publish and delete.
    delay: Mutex<Duration>,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    pub fn visible(&self) -> usize {
        self.visible.lock().len()
    }

    /// Drop a message as if someone deleted it by hand.
    pub fn forget(&self, message_id: &str) {
        self.visible.lock().remove(message_id);
    }

    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    async fn stall(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl NotificationSink for FakeSink {
    async fn publish(&self, destination: &str, message: &OutgoingMessage) -> Result<String> {
        self.stall().await;
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(Error::notification("Discord API returned 403 Forbidden"));
        }
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1000).to_string();
        self.visible.lock().insert(id.clone());
        self.published.lock().push(Published {
            destination: destination.to_string(),
            message_id: id.clone(),
            content: message.content.clone(),
            title: message.embed.title.clone(),
        });
        Ok(id)
    }

    async fn delete(&self, _destination: &str, message_id: &str) -> Result<DeleteOutcome> {
        self.stall().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::notification("Discord API returned 500"));
        }
        if self.visible.lock().remove(message_id) {
            self.deleted.lock().push(message_id.to_string());
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}

/// A container wired to fakes.
pub struct Harness {
    pub services: Arc<ServiceContainer>,
    pub twitch: Arc<FakeProvider>,
    pub youtube: Arc<FakeProvider>,
    pub sink: Arc<FakeSink>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_settings(AppConfig {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .await
    }

    pub async fn with_settings(settings: AppConfig) -> Self {
        let pool = setup_test_db().await;
        let twitch = FakeProvider::new(Platform::Twitch);
        let youtube = FakeProvider::new(Platform::Youtube);
        let sink = FakeSink::new();

        let sources = StatusSources::new()
            .with(twitch.clone())
            .with(youtube.clone());
        let discord = Arc::new(DiscordSink::new(platforms_status::default_client()));

        let services = ServiceContainer::with_components(pool, settings, sources, sink.clone(), discord)
            .await
            .expect("Failed to build container");
        services
            .update_configuration(ConfigurationUpdate {
                discord_channel_id: Some(DESTINATION.to_string()),
                ..Default::default()
            })
            .await
            .expect("Failed to set destination");

        Self {
            services: Arc::new(services),
            twitch,
            youtube,
            sink,
        }
    }

    pub async fn register(&self, platform: Platform, username: &str) -> Channel {
        self.services
            .channels
            .register(NewChannel {
                platform,
                username: username.to_string(),
                display_name: capitalize(username),
                custom_message: None,
            })
            .await
            .expect("Failed to register channel")
    }

    pub async fn channel(&self, id: &str) -> Channel {
        self.services.channels.get(id).await.expect("Channel missing")
    }

    pub async fn ledger_len(&self) -> usize {
        self.services
            .channels
            .notifications()
            .await
            .expect("Failed to list ledger")
            .len()
    }

    pub async fn activity_messages(&self) -> Vec<String> {
        self.services
            .activity
            .recent(100)
            .await
            .expect("Failed to read activity")
            .into_iter()
            .map(|e| e.message)
            .collect()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Poll `check` until it holds or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
