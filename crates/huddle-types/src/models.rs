use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ChannelId = u64;
pub type MessageId = u64;

/// One reaction slot on a message, rendered for a specific viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactView {
    pub u_ids: Vec<UserId>,
    pub is_this_user_reacted: bool,
    pub react_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    /// Unix seconds.
    pub time_created: i64,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

/// A window of at most 50 messages, newest first.
///
/// `end` is `start + 50` when older messages remain, otherwise `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<MessageView>,
    pub start: usize,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub u_id: UserId,
    pub handle_str: String,
}

/// Public view of a registered user. The password hash never leaves the db
/// crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub u_id: UserId,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetails {
    pub name: String,
    pub all_members: Vec<MemberView>,
    pub owner_members: Vec<MemberView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupStatus {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}
