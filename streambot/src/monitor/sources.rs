//! Platform dispatch for status queries.

use std::collections::HashMap;
use std::sync::Arc;

use platforms_status::{
    Platform, ProviderCredentials, ProviderError, StatusProvider, StreamStatus, TwitchProvider,
    YoutubeProvider,
};
use reqwest::Client;
use strum::IntoEnumIterator;

/// Lookup table of status providers keyed by platform.
#[derive(Default)]
pub struct StatusSources {
    providers: HashMap<Platform, Arc<dyn StatusProvider>>,
}

impl StatusSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Twitch and YouTube providers sharing `client`.
    pub fn with_defaults(client: Client) -> Self {
        Self::new()
            .with(Arc::new(TwitchProvider::new(client.clone())))
            .with(Arc::new(YoutubeProvider::new(client)))
    }

    /// Register a provider, replacing any previous one for its platform.
    pub fn with(mut self, provider: Arc<dyn StatusProvider>) -> Self {
        self.providers.insert(provider.platform(), provider);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn StatusProvider>> {
        self.providers.get(&platform)
    }

    /// Platforms without a registered provider.
    pub fn missing_platforms(&self) -> Vec<Platform> {
        Platform::iter()
            .filter(|p| !self.providers.contains_key(p))
            .collect()
    }

    /// Hand the latest credentials to every provider.
    pub fn configure(&self, credentials: &ProviderCredentials) {
        for provider in self.providers.values() {
            provider.configure(credentials);
        }
    }

    pub async fn query(
        &self,
        platform: Platform,
        username: &str,
    ) -> Result<StreamStatus, ProviderError> {
        let provider = self.get(platform).ok_or_else(|| {
            ProviderError::Other(format!("no status provider for {}", platform.display_name()))
        })?;
        provider.query(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platforms_status::default_client;

    #[test]
    fn test_defaults_cover_every_platform() {
        let sources = StatusSources::with_defaults(default_client());
        assert!(sources.missing_platforms().is_empty());
        assert_eq!(sources.get(Platform::Youtube).unwrap().platform(), Platform::Youtube);
    }

    #[tokio::test]
    async fn test_query_unregistered_platform() {
        let sources = StatusSources::new();
        assert_eq!(sources.missing_platforms().len(), 2);
        let err = sources.query(Platform::Twitch, "alice").await.unwrap_err();
        assert!(matches!(err, ProviderError::Other(_)));
    }
}
