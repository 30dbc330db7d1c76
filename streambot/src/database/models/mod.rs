//! Row models.
//!
//! These map one-to-one onto the schema; conversions into domain types live
//! next to each model.

pub mod activity;
pub mod channel;
pub mod config;
pub mod notification;

pub use activity::*;
pub use channel::*;
pub use config::*;
pub use notification::*;
