//! streambot library crate.
//!
//! Watches Twitch and YouTube channels and keeps one Discord notification
//! per live session: published when a channel goes live, deleted when it
//! goes offline.

pub mod activity;
pub mod api;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod services;

pub use error::{Error, Result};
