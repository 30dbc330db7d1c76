//! Per-channel async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per channel id.
///
/// Every mutation of a channel's status or notifications happens under its
/// lock, so work on distinct channels proceeds concurrently while the same
/// channel is never raced.
#[derive(Default)]
pub struct ChannelLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock of `channel_id`.
    pub async fn lock(&self, channel_id: &str) -> OwnedMutexGuard<()> {
        self.get_lock(channel_id).lock_owned().await
    }

    fn get_lock(&self, channel_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(channel_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock of a deleted channel.
    ///
    /// Anyone still holding or waiting on the old lock keeps it; they re-read
    /// the channel under the lock and find it gone.
    pub fn remove(&self, channel_id: &str) {
        self.locks.remove(channel_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_channel_is_exclusive() {
        let locks = Arc::new(ChannelLocks::new());
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_channels_do_not_block() {
        let locks = ChannelLocks::new();
        let _a = locks.lock("a").await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b"))
            .await
            .unwrap();
        assert_eq!(locks.locks.len(), 2);

        locks.remove("a");
        assert_eq!(locks.locks.len(), 1);
    }
}
