use serde::{Deserialize, Serialize};

use huddle_types::UserId;
use huddle_types::models::ReactView;

use crate::error::{CoreError, Result};

/// The reaction kinds a message can carry. Wire ids are stable; new kinds
/// append new slots without changing the `reacts` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactKind {
    Like,
}

impl ReactKind {
    pub const ALL: [ReactKind; 1] = [ReactKind::Like];

    pub fn id(self) -> u32 {
        match self {
            Self::Like => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Like => "like",
        }
    }

    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| CoreError::invalid(format!("invalid react id {id}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReactSlot {
    kind: ReactKind,
    reactors: Vec<UserId>,
}

/// Per-message reaction overlay: one slot per kind, each an ordered set of
/// reactor ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reactions {
    slots: Vec<ReactSlot>,
}

impl Default for Reactions {
    fn default() -> Self {
        Self {
            slots: ReactKind::ALL
                .into_iter()
                .map(|kind| ReactSlot {
                    kind,
                    reactors: Vec::new(),
                })
                .collect(),
        }
    }
}

impl Reactions {
    fn slot_mut(&mut self, kind: ReactKind) -> &mut ReactSlot {
        // Snapshots written before a kind existed won't have its slot yet.
        let pos = match self.slots.iter().position(|s| s.kind == kind) {
            Some(pos) => pos,
            None => {
                self.slots.push(ReactSlot {
                    kind,
                    reactors: Vec::new(),
                });
                self.slots.len() - 1
            }
        };
        &mut self.slots[pos]
    }

    pub fn has_reacted(&self, user: UserId, kind: ReactKind) -> bool {
        self.slots
            .iter()
            .any(|s| s.kind == kind && s.reactors.contains(&user))
    }

    pub fn react(&mut self, user: UserId, kind: ReactKind) -> Result<()> {
        if self.has_reacted(user, kind) {
            return Err(CoreError::invalid("message has already been reacted to"));
        }
        self.slot_mut(kind).reactors.push(user);
        Ok(())
    }

    pub fn unreact(&mut self, user: UserId, kind: ReactKind) -> Result<()> {
        if !self.has_reacted(user, kind) {
            return Err(CoreError::invalid("message has no existing react"));
        }
        self.slot_mut(kind).reactors.retain(|&u| u != user);
        Ok(())
    }

    pub fn views(&self, viewer: UserId) -> Vec<ReactView> {
        self.slots
            .iter()
            .map(|s| ReactView {
                u_ids: s.reactors.clone(),
                is_this_user_reacted: s.reactors.contains(&viewer),
                react_id: s.kind.id(),
            })
            .collect()
    }
}
