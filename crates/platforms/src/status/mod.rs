mod platform;
mod stream_status;

pub use platform::{ChannelRef, Platform};
pub use stream_status::{StreamStatus, StreamStatusBuilder};
