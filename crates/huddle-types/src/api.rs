use serde::{Deserialize, Serialize};

use crate::models::{ChannelId, ChannelSummary, MessageId, MessageView, UserId, UserProfile};

// -- JWT Claims --

/// Claims carried by every bearer token issued by the auth routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub handle: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub u_id: UserId,
    pub token: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub u_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChannelResponse {
    pub channel_id: ChannelId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelSummary>,
}

/// Body for invite and add-owner: the user being acted upon.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetUserRequest {
    pub u_id: UserId,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: MessageId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendLaterRequest {
    pub message: String,
    /// Unix seconds at which the message should be posted.
    pub time_sent: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendLaterResponse {
    pub time_sent: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message: String,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub react_id: u32,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    /// Duration in seconds.
    pub length: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StandupStartResponse {
    pub time_finish: i64,
}

// -- Search --

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub messages: Vec<MessageView>,
}
