//! Live status lookups for streaming platforms.
//!
//! Each supported platform implements [`StatusProvider`], answering a single
//! question: is this channel live right now, and with what metadata.
//!
//! ```rust,ignore
//! use platforms_status::{ProviderCredentials, StatusProvider, TwitchProvider};
//!
//! let provider = TwitchProvider::new(platforms_status::default_client());
//! provider.configure(&ProviderCredentials {
//!     twitch_client_id: Some("client-id".into()),
//!     twitch_client_secret: Some("secret".into()),
//!     ..Default::default()
//! });
//! let status = provider.query("alice").await?;
//! ```

pub mod provider;
pub mod status;

pub use provider::error::ProviderError;
pub use provider::platforms::twitch::TwitchProvider;
pub use provider::platforms::youtube::YoutubeProvider;
pub use provider::status_provider::{ProviderCredentials, StatusProvider};
pub use provider::{create_client_builder, default_client};
pub use status::{ChannelRef, Platform, StreamStatus};
