use serde::{Deserialize, Serialize};

use huddle_types::UserId;

use crate::error::{CoreError, Result};

/// Members and owners of one channel, kept in join order.
///
/// `owners` is always a subset of `members`; every mutation below preserves
/// that. The owner list is allowed to become empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Membership {
    members: Vec<UserId>,
    owners: Vec<UserId>,
}

impl Membership {
    /// A fresh channel where `creator` is the sole member and owner.
    pub fn with_creator(creator: UserId) -> Self {
        Self {
            members: vec![creator],
            owners: vec![creator],
        }
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owners.contains(&user)
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn owners(&self) -> &[UserId] {
        &self.owners
    }

    /// Returns false when the user was already a member.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.is_member(user) {
            return false;
        }
        self.members.push(user);
        true
    }

    /// Drops the user from both lists. Returns false if they were not a member.
    pub fn remove_member(&mut self, user: UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|&m| m != user);
        self.owners.retain(|&o| o != user);
        self.members.len() != before
    }

    pub fn add_owner(&mut self, user: UserId) -> Result<()> {
        if !self.is_member(user) {
            return Err(CoreError::invalid(format!("user {user} is not a member")));
        }
        if self.is_owner(user) {
            return Err(CoreError::invalid(format!("user {user} is already an owner")));
        }
        self.owners.push(user);
        Ok(())
    }

    pub fn remove_owner(&mut self, user: UserId) -> Result<()> {
        if !self.is_owner(user) {
            return Err(CoreError::invalid(format!("user {user} is not an owner")));
        }
        self.owners.retain(|&o| o != user);
        Ok(())
    }

    pub(crate) fn require_member(&self, user: UserId, channel: u64) -> Result<()> {
        if self.is_member(user) {
            Ok(())
        } else {
            Err(CoreError::denied(format!(
                "user {user} is not a member of channel {channel}"
            )))
        }
    }
}
