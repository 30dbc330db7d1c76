//! Repository layer for database access.
//!
//! Each repository is a trait with an sqlx implementation so services can be
//! exercised against in-memory databases.

pub mod activity;
pub mod channel;
pub mod config;
pub mod ledger;

pub use activity::*;
pub use channel::*;
pub use config::*;
pub use ledger::*;
