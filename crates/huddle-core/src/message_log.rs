use serde::{Deserialize, Serialize};

use huddle_types::models::{MessagePage, MessageView};
use huddle_types::{ChannelId, MessageId, UserId};

use crate::error::{CoreError, Result};
use crate::reactions::Reactions;

/// Fixed page size for `MessageLog::page`. Clients depend on it.
pub const PAGE_SIZE: usize = 50;

/// Message bodies must be strictly shorter than this many characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

pub fn validate_body(body: &str) -> Result<()> {
    if body.chars().count() >= MAX_MESSAGE_LEN {
        return Err(CoreError::invalid(format!(
            "message exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: UserId,
    pub channel: ChannelId,
    pub body: String,
    pub created_at: i64,
    pub pinned: bool,
    pub reactions: Reactions,
}

impl Message {
    pub fn new(id: MessageId, author: UserId, channel: ChannelId, body: String, created_at: i64) -> Self {
        Self {
            id,
            author,
            channel,
            body,
            created_at,
            pinned: false,
            reactions: Reactions::default(),
        }
    }

    pub fn pin(&mut self) -> Result<()> {
        if self.pinned {
            return Err(CoreError::invalid("message is already pinned"));
        }
        self.pinned = true;
        Ok(())
    }

    pub fn unpin(&mut self) -> Result<()> {
        if !self.pinned {
            return Err(CoreError::invalid("message is not pinned"));
        }
        self.pinned = false;
        Ok(())
    }

    /// Render for `viewer`; only `is_this_user_reacted` depends on who is asking.
    pub fn view(&self, viewer: UserId) -> MessageView {
        MessageView {
            message_id: self.id,
            u_id: self.author,
            message: self.body.clone(),
            time_created: self.created_at,
            reacts: self.reactions.views(viewer),
            is_pinned: self.pinned,
        }
    }
}

/// One channel's messages.
///
/// Stored oldest-first so the vector stays sorted by id (ids are allocated
/// under the channel lock); callers always see it newest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn push(&mut self, message: Message) {
        debug_assert!(self.messages.last().is_none_or(|last| last.id < message.id));
        self.messages.push(message);
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.position(id).map(|pos| &self.messages[pos])
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.position(id).map(|pos| &mut self.messages[pos])
    }

    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        self.position(id).map(|pos| self.messages.remove(pos))
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev()
    }

    pub fn ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.messages.iter().map(|m| m.id)
    }

    /// Up to `PAGE_SIZE` messages starting `start` places back from the newest.
    pub fn page(&self, start: usize, viewer: UserId) -> Result<MessagePage> {
        let total = self.messages.len();
        if start > total {
            return Err(CoreError::invalid(format!(
                "start {start} exceeds total of {total} messages"
            )));
        }

        let messages = self
            .newest_first()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|m| m.view(viewer))
            .collect();

        let end = if start + PAGE_SIZE >= total {
            -1
        } else {
            (start + PAGE_SIZE) as i64
        };

        Ok(MessagePage {
            messages,
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(n: u64) -> MessageLog {
        let mut log = MessageLog::default();
        for id in 1..=n {
            log.push(Message::new(id, 1, 1, format!("m{id}"), 1_000 + id as i64));
        }
        log
    }

    #[test]
    fn page_is_newest_first() {
        let log = log_with(3);
        let page = log.page(0, 1).unwrap();
        let ids: Vec<_> = page.messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(page.end, -1);
    }

    #[test]
    fn exactly_one_full_page_has_no_more() {
        let page = log_with(50).page(0, 1).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, -1);
    }

    #[test]
    fn page_boundaries_with_fifty_one_messages() {
        let log = log_with(51);

        let first = log.page(0, 1).unwrap();
        assert_eq!(first.messages.len(), 50);
        assert_eq!(first.end, 50);
        assert_eq!(first.messages[0].message_id, 51);

        let second = log.page(50, 1).unwrap();
        assert_eq!(second.messages.len(), 1);
        assert_eq!(second.messages[0].message_id, 1);
        assert_eq!(second.start, 50);
        assert_eq!(second.end, -1);
    }

    #[test]
    fn start_equal_to_total_is_an_empty_page() {
        let page = log_with(4).page(4, 1).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.end, -1);
    }

    #[test]
    fn start_past_total_is_rejected() {
        assert!(matches!(
            log_with(4).page(5, 1),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut log = log_with(5);
        assert!(log.remove(3).is_some());
        assert!(log.remove(3).is_none());
        assert!(log.get(3).is_none());
        assert_eq!(log.ids().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
    }

    #[test]
    fn pin_twice_fails() {
        let mut msg = Message::new(1, 1, 1, "hi".into(), 0);
        msg.pin().unwrap();
        assert!(msg.view(1).is_pinned);
        assert!(matches!(msg.pin(), Err(CoreError::InvalidArgument(_))));
        msg.unpin().unwrap();
        assert!(matches!(msg.unpin(), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn body_length_limit() {
        assert!(validate_body(&"a".repeat(999)).is_ok());
        assert!(validate_body(&"a".repeat(1000)).is_err());
    }
}
