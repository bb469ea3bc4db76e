pub mod api;
pub mod models;

pub use models::{ChannelId, MessageId, UserId};
