mod builder;
mod models;

pub use builder::TwitchProvider;
