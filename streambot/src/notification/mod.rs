//! Live notifications.
//!
//! - [`message`] builds the rich announcement for a channel going live.
//! - [`sink`] is the seam to the chat destination; [`discord`] implements it
//!   over the Discord REST API.
//! - [`lifecycle`] ties a channel's live state to its outstanding messages.
//!
//! ```ignore
//! let lifecycle = NotificationLifecycle::new(sink, ledger, activity, timeout);
//! let record = lifecycle.create_for(&channel, &config).await?;
//! let report = lifecycle.teardown_for(&channel).await?;
//! ```

pub mod discord;
pub mod lifecycle;
pub mod message;
pub mod sink;

pub use discord::DiscordSink;
pub use lifecycle::{NotificationLifecycle, TeardownReport};
pub use message::{Embed, EmbedField, OutgoingMessage};
pub use sink::{DeleteOutcome, NotificationSink};
