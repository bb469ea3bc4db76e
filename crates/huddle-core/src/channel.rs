use serde::{Deserialize, Serialize};

use huddle_types::{ChannelId, UserId};
use huddle_types::models::ChannelSummary;

use crate::hangman::Hangman;
use crate::membership::Membership;
use crate::message_log::MessageLog;
use crate::standup::StandupSession;

/// Channel names longer than this are rejected.
pub const MAX_CHANNEL_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_public(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }
}

/// Everything one channel owns. Guarded as a unit by the store's per-channel lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub visibility: Visibility,
    pub membership: Membership,
    pub log: MessageLog,
    pub standup: StandupSession,
    #[serde(default)]
    pub hangman: Hangman,
}

impl Channel {
    pub fn new(id: ChannelId, name: String, visibility: Visibility, creator: UserId) -> Self {
        Self {
            id,
            name,
            visibility,
            membership: Membership::with_creator(creator),
            log: MessageLog::default(),
            standup: StandupSession::default(),
            hangman: Hangman::default(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn summary(&self) -> ChannelSummary {
        ChannelSummary {
            channel_id: self.id,
            name: self.name.clone(),
        }
    }
}
