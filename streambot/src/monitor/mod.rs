//! Reconciliation engine.
//!
//! Responsible for:
//! - Polling every channel's platform on a timer, with bounded concurrency
//! - Detecting live/offline transitions against the stored status
//! - Publishing and tearing down notifications for those transitions
//! - Isolating failures to the channel that caused them

mod engine;
mod locks;
mod scheduler;
mod sources;
mod transition;

pub use engine::{CycleReport, EngineSettings, ReconciliationEngine};
pub use locks::ChannelLocks;
pub use scheduler::Scheduler;
pub use sources::StatusSources;
pub use transition::Transition;
