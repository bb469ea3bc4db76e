//! Standups: a per-channel buffer that collects `handle: line` entries for a
//! fixed window and then posts them as one message from the initiator.
//!
//! Expiry is checked whenever a standup operation touches the channel. The
//! scheduler also arms a timer that runs the same check at the deadline, but
//! the on-access check is what guarantees the commit.

use serde::{Deserialize, Serialize};
use tracing::info;

use huddle_types::models::StandupStatus;
use huddle_types::{ChannelId, MessageId, UserId};

use crate::channel::Channel;
use crate::error::{CoreError, Result};
use crate::message_log::validate_body;
use crate::store::{Store, lock};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StandupSession {
    #[default]
    Idle,
    Active {
        finish_at: i64,
        initiator: UserId,
        buffer: String,
    },
}

impl StandupSession {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Begin a window of `duration` seconds. Returns the finish time.
    pub fn start(&mut self, initiator: UserId, now: i64, duration: i64) -> Result<i64> {
        if self.is_active() {
            return Err(CoreError::invalid("standup is already active in this channel"));
        }
        let finish_at = now.saturating_add(duration);
        *self = Self::Active {
            finish_at,
            initiator,
            buffer: String::new(),
        };
        Ok(finish_at)
    }

    pub fn append(&mut self, handle: &str, line: &str) -> Result<()> {
        match self {
            Self::Active { buffer, .. } => {
                buffer.push_str(handle);
                buffer.push_str(": ");
                buffer.push_str(line);
                buffer.push('\n');
                Ok(())
            }
            Self::Idle => Err(CoreError::invalid(
                "no currently active standup in this channel",
            )),
        }
    }

    /// If the window has closed, reset to idle and hand back the initiator
    /// and everything buffered.
    pub fn take_due(&mut self, now: i64) -> Option<(UserId, String)> {
        match self {
            Self::Active { finish_at, .. } if *finish_at <= now => {
                match std::mem::take(self) {
                    Self::Active {
                        initiator, buffer, ..
                    } => Some((initiator, buffer)),
                    Self::Idle => None,
                }
            }
            _ => None,
        }
    }

    pub fn buffered(&self) -> Option<&str> {
        match self {
            Self::Active { buffer, .. } => Some(buffer),
            Self::Idle => None,
        }
    }

    pub fn status(&self) -> StandupStatus {
        match self {
            Self::Active { finish_at, .. } => StandupStatus {
                is_active: true,
                time_finish: Some(*finish_at),
            },
            Self::Idle => StandupStatus {
                is_active: false,
                time_finish: None,
            },
        }
    }
}

impl Store {
    /// Commit a finished standup on a locked channel, even when nothing was
    /// buffered.
    fn flush_standup(&self, channel: &mut Channel, now: i64) -> Result<Option<MessageId>> {
        let Some((initiator, text)) = channel.standup.take_due(now) else {
            return Ok(None);
        };
        let id = self.commit_message(channel, initiator, text)?;
        info!("Standup in channel {} committed as message {}", channel.id, id);
        Ok(Some(id))
    }

    pub fn standup_start(&self, channel: ChannelId, actor: UserId, length: u64) -> Result<i64> {
        let duration = i64::try_from(length)
            .map_err(|_| CoreError::invalid("standup length is out of range"))?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;

        let now = self.now();
        self.flush_standup(&mut ch, now)?;
        let finish_at = ch.standup.start(actor, now, duration)?;
        info!(
            "Standup started in channel {} by user {}, finishing at {}",
            channel, actor, finish_at
        );
        Ok(finish_at)
    }

    /// Buffer one line. The line is appended before the expiry check, so a
    /// line arriving at the deadline is part of the commit.
    pub fn standup_send(&self, channel: ChannelId, actor: UserId, line: &str) -> Result<()> {
        validate_body(line)?;
        let handle = self.channel(channel)?;
        let user_handle = self.directory().user_handle(actor)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;

        ch.standup.append(&user_handle, line)?;
        self.flush_standup(&mut ch, self.now())?;
        Ok(())
    }

    pub fn standup_active(&self, channel: ChannelId, actor: UserId) -> Result<StandupStatus> {
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;

        self.flush_standup(&mut ch, self.now())?;
        Ok(ch.standup.status())
    }

    /// Run the expiry check without an actor. Used by the deadline timer.
    pub fn flush_standup_if_due(&self, channel: ChannelId) -> Result<Option<MessageId>> {
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        self.flush_standup(&mut ch, self.now())
    }

    /// Text buffered so far in an active standup.
    pub fn standup_buffer(&self, channel: ChannelId, actor: UserId) -> Result<Option<String>> {
        let handle = self.channel(channel)?;
        let ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;
        Ok(ch.standup.buffered().map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rejects_a_second_session() {
        let mut s = StandupSession::default();
        assert_eq!(s.start(1, 100, 5).unwrap(), 105);
        assert!(matches!(s.start(1, 101, 5), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn append_requires_an_active_session() {
        let mut s = StandupSession::default();
        assert!(matches!(s.append("ada", "hi"), Err(CoreError::InvalidArgument(_))));
        s.start(1, 0, 5).unwrap();
        s.append("ada", "hi").unwrap();
        s.append("bob", "yo").unwrap();
        assert_eq!(s.buffered(), Some("ada: hi\nbob: yo\n"));
    }

    #[test]
    fn take_due_resets_everything_together() {
        let mut s = StandupSession::default();
        s.start(4, 0, 5).unwrap();
        s.append("ada", "hi").unwrap();

        assert_eq!(s.take_due(4), None);
        assert!(s.is_active());

        assert_eq!(s.take_due(5), Some((4, "ada: hi\n".to_string())));
        assert_eq!(s, StandupSession::Idle);
        assert_eq!(
            s.status(),
            StandupStatus {
                is_active: false,
                time_finish: None
            }
        );
    }
}
