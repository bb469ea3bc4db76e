use tracing::info;

use huddle_types::models::{ChannelDetails, ChannelSummary, MemberView};
use huddle_types::{ChannelId, UserId};

use crate::channel::{Channel, MAX_CHANNEL_NAME_LEN, Visibility};
use crate::error::{CoreError, Result};
use crate::store::{Store, lock};

impl Store {
    /// Create a channel with `actor` as its only member and owner.
    pub fn create_channel(&self, actor: UserId, name: &str, is_public: bool) -> Result<ChannelId> {
        if name.chars().count() > MAX_CHANNEL_NAME_LEN {
            return Err(CoreError::invalid(format!(
                "channel name must be at most {} characters",
                MAX_CHANNEL_NAME_LEN
            )));
        }

        let id = self.allocate_channel_id();
        let visibility = Visibility::from_public(is_public);
        self.insert_channel(Channel::new(id, name.to_string(), visibility, actor))?;
        info!("Channel {} ({:?}) created by user {}", id, name, actor);
        Ok(id)
    }

    fn list_where(&self, keep: impl Fn(&Channel) -> bool) -> Result<Vec<ChannelSummary>> {
        let mut out = Vec::new();
        for handle in self.all_channels()? {
            let ch = lock(&handle)?;
            if keep(&ch) {
                out.push(ch.summary());
            }
        }
        Ok(out)
    }

    /// Channels the actor belongs to, in creation order.
    pub fn list_mine(&self, actor: UserId) -> Result<Vec<ChannelSummary>> {
        self.list_where(|ch| ch.membership.is_member(actor))
    }

    /// Channels visible to the actor: public ones, their own, or all of them
    /// for a global owner.
    pub fn list_all(&self, actor: UserId) -> Result<Vec<ChannelSummary>> {
        let global_owner = self.directory().is_global_owner(actor)?;
        self.list_where(|ch| global_owner || ch.is_public() || ch.membership.is_member(actor))
    }

    pub fn details(&self, actor: UserId, channel: ChannelId) -> Result<ChannelDetails> {
        let (name, members, owners) = {
            let handle = self.channel(channel)?;
            let ch = lock(&handle)?;
            ch.membership.require_member(actor, channel)?;
            (
                ch.name.clone(),
                ch.membership.members().to_vec(),
                ch.membership.owners().to_vec(),
            )
        };

        let render = |ids: Vec<UserId>| -> Result<Vec<MemberView>> {
            ids.into_iter()
                .map(|u_id| {
                    Ok(MemberView {
                        u_id,
                        handle_str: self.directory().user_handle(u_id)?,
                    })
                })
                .collect()
        };

        Ok(ChannelDetails {
            name,
            all_members: render(members)?,
            owner_members: render(owners)?,
        })
    }

    /// Join a public channel. Joining twice is a no-op.
    pub fn join(&self, actor: UserId, channel: ChannelId) -> Result<()> {
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        if !ch.is_public() {
            return Err(CoreError::denied(format!("channel {channel} is a private channel")));
        }
        if ch.membership.add_member(actor) {
            info!("User {} joined channel {}", actor, channel);
        }
        Ok(())
    }

    pub fn invite(&self, actor: UserId, channel: ChannelId, target: UserId) -> Result<()> {
        let target_exists = self.directory().user_exists(target)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;
        if !target_exists {
            return Err(CoreError::not_found(format!("user {target}")));
        }
        if ch.membership.add_member(target) {
            info!("User {} invited user {} to channel {}", actor, target, channel);
        }
        Ok(())
    }

    pub fn leave(&self, actor: UserId, channel: ChannelId) -> Result<()> {
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;
        ch.membership.require_member(actor, channel)?;
        ch.membership.remove_member(actor);
        info!("User {} left channel {}", actor, channel);
        Ok(())
    }

    /// Promote a member. Input problems are reported before permission ones.
    pub fn add_owner(&self, actor: UserId, channel: ChannelId, target: UserId) -> Result<()> {
        let target_exists = self.directory().user_exists(target)?;
        let global_owner = self.directory().is_global_owner(actor)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;

        if !target_exists {
            return Err(CoreError::not_found(format!("user {target}")));
        }
        if !ch.membership.is_member(target) {
            return Err(CoreError::invalid(format!(
                "user {target} is not a member of channel {channel}"
            )));
        }
        if ch.membership.is_owner(target) {
            return Err(CoreError::invalid(format!("user {target} is already an owner")));
        }
        require_owner(&ch, actor, global_owner)?;

        ch.membership.add_owner(target)?;
        info!("User {} promoted user {} in channel {}", actor, target, channel);
        Ok(())
    }

    pub fn remove_owner(&self, actor: UserId, channel: ChannelId, target: UserId) -> Result<()> {
        let target_exists = self.directory().user_exists(target)?;
        let global_owner = self.directory().is_global_owner(actor)?;
        let handle = self.channel(channel)?;
        let mut ch = lock(&handle)?;

        if !target_exists {
            return Err(CoreError::not_found(format!("user {target}")));
        }
        if !ch.membership.is_owner(target) {
            return Err(CoreError::invalid(format!(
                "user {target} is not an owner of channel {channel}"
            )));
        }
        require_owner(&ch, actor, global_owner)?;

        ch.membership.remove_owner(target)?;
        info!("User {} demoted user {} in channel {}", actor, target, channel);
        Ok(())
    }
}

fn require_owner(channel: &Channel, actor: UserId, global_owner: bool) -> Result<()> {
    if global_owner || channel.membership.is_owner(actor) {
        Ok(())
    } else {
        Err(CoreError::denied(format!(
            "user {actor} is not an owner of the workspace or channel {}",
            channel.id
        )))
    }
}
