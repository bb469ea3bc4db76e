use tracing::{debug, info};

use huddle_types::models::{MessagePage, MessageView};
use huddle_types::{ChannelId, MessageId, UserId};

use crate::channel::Channel;
use crate::error::{CoreError, Result};
use crate::hangman::{HangmanCommand, random_word};
use crate::message_log::{Message, validate_body};
use crate::reactions::ReactKind;
use crate::store::{Store, lock};

/// Author, channel owner or global owner may edit, remove and pin.
fn may_moderate(channel: &Channel, message: &Message, actor: UserId, global_owner: bool) -> bool {
    message.author == actor || global_owner || channel.membership.is_owner(actor)
}

fn missing(message: MessageId) -> CoreError {
    CoreError::not_found(format!("message {message}"))
}

impl Store {
    /// Checks shared by immediate and deferred sends.
    pub fn check_can_send(&self, channel: ChannelId, actor: UserId, body: &str) -> Result<()> {
        validate_body(body)?;
        let handle = self.channel(channel)?;
        let ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)
    }

    /// Post a message. Bodies carrying a hangman command drive the channel's
    /// game and post its progress instead.
    pub fn send(&self, channel: ChannelId, actor: UserId, body: &str) -> Result<MessageId> {
        validate_body(body)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;

        let text = match HangmanCommand::parse(body) {
            Some(HangmanCommand::Start) => {
                ch.hangman.start(random_word());
                info!("Hangman started in channel {} by user {}", channel, actor);
                ch.hangman.render()
            }
            Some(HangmanCommand::Guess(letter)) => {
                ch.hangman.guess(&letter)?;
                ch.hangman.render()
            }
            None => body.to_string(),
        };

        self.commit_message(&mut ch, actor, text)
    }

    pub fn page(&self, channel: ChannelId, actor: UserId, start: usize) -> Result<MessagePage> {
        let handle = self.channel(channel)?;
        let ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;
        ch.log.page(start, actor)
    }

    /// Replace a message body. An empty body removes the message.
    pub fn edit(&self, actor: UserId, message: MessageId, body: &str) -> Result<()> {
        validate_body(body)?;
        let channel = self.channel_of(message)?;
        let global_owner = self.directory().is_global_owner(actor)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;

        let msg = ch.log.get(message).ok_or_else(|| missing(message))?;
        if !may_moderate(&ch, msg, actor, global_owner) {
            return Err(CoreError::denied("user is not authorised to edit message"));
        }

        if body.is_empty() {
            ch.log.remove(message);
            self.forget_message(message)?;
            debug!("Message {} removed by empty edit", message);
        } else if let Some(msg) = ch.log.get_mut(message) {
            msg.body = body.to_string();
        }
        Ok(())
    }

    pub fn remove(&self, actor: UserId, message: MessageId) -> Result<()> {
        let channel = self.channel_of(message)?;
        let global_owner = self.directory().is_global_owner(actor)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;

        let msg = ch.log.get(message).ok_or_else(|| missing(message))?;
        if !may_moderate(&ch, msg, actor, global_owner) {
            return Err(CoreError::denied("user is not authorised to remove message"));
        }

        ch.log.remove(message);
        self.forget_message(message)?;
        debug!("Message {} removed from channel {}", message, channel);
        Ok(())
    }

    pub fn react(&self, actor: UserId, message: MessageId, react_id: u32) -> Result<()> {
        self.with_reactions(actor, message, react_id, |msg, kind| {
            msg.reactions.react(actor, kind)
        })
    }

    pub fn unreact(&self, actor: UserId, message: MessageId, react_id: u32) -> Result<()> {
        self.with_reactions(actor, message, react_id, |msg, kind| {
            msg.reactions.unreact(actor, kind)
        })
    }

    fn with_reactions(
        &self,
        actor: UserId,
        message: MessageId,
        react_id: u32,
        f: impl FnOnce(&mut Message, ReactKind) -> Result<()>,
    ) -> Result<()> {
        let kind = ReactKind::from_id(react_id)?;
        let channel = self.channel_of(message)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;

        let msg = ch.log.get_mut(message).ok_or_else(|| missing(message))?;
        f(msg, kind)
    }

    pub fn pin(&self, actor: UserId, message: MessageId) -> Result<()> {
        self.with_moderation(actor, message, Message::pin)
    }

    pub fn unpin(&self, actor: UserId, message: MessageId) -> Result<()> {
        self.with_moderation(actor, message, Message::unpin)
    }

    fn with_moderation(
        &self,
        actor: UserId,
        message: MessageId,
        f: impl FnOnce(&mut Message) -> Result<()>,
    ) -> Result<()> {
        let channel = self.channel_of(message)?;
        let global_owner = self.directory().is_global_owner(actor)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;

        let msg = ch.log.get(message).ok_or_else(|| missing(message))?;
        if !may_moderate(&ch, msg, actor, global_owner) {
            return Err(CoreError::denied(format!(
                "user {actor} is not an owner of the workspace or channel {channel}"
            )));
        }
        let msg = ch.log.get_mut(message).ok_or_else(|| missing(message))?;
        f(msg)
    }

    /// Messages containing `query` in every channel the actor belongs to,
    /// channels in creation order and newest first within each.
    pub fn search(&self, actor: UserId, query: &str) -> Result<Vec<MessageView>> {
        let mut found = Vec::new();
        for handle in self.all_channels()? {
            let ch = lock(&handle)?;
            if !ch.membership.is_member(actor) {
                continue;
            }
            found.extend(
                ch.log
                    .newest_first()
                    .filter(|m| m.body.contains(query))
                    .map(|m| m.view(actor)),
            );
        }
        Ok(found)
    }
}
