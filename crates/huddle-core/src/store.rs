use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, info};

use huddle_types::{ChannelId, MessageId, UserId};

use crate::channel::Channel;
use crate::clock::Clock;
use crate::directory::UserDirectory;
use crate::error::{CoreError, Result};
use crate::message_log::Message;
use crate::snapshot::StoreSnapshot;

pub(crate) type ChannelHandle = Arc<Mutex<Channel>>;

/// The single in-memory store behind every channel operation.
///
/// Each channel sits behind its own mutex. The channel table and the
/// message → channel index have their own locks; a channel lock may be held
/// while taking the index lock, never the other way round.
pub struct Store {
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    next_channel_id: AtomicU64,
    next_message_id: AtomicU64,
    channels: RwLock<BTreeMap<ChannelId, ChannelHandle>>,
    message_index: RwLock<HashMap<MessageId, ChannelId>>,
}

impl Store {
    pub fn new(directory: Arc<dyn UserDirectory>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            clock,
            next_channel_id: AtomicU64::new(1),
            next_message_id: AtomicU64::new(1),
            channels: RwLock::new(BTreeMap::new()),
            message_index: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a store from a snapshot. Counters resume past every id the
    /// snapshot contains, so ids are never handed out twice.
    pub fn from_snapshot(
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
        snapshot: StoreSnapshot,
    ) -> Self {
        let mut channels = BTreeMap::new();
        let mut index = HashMap::new();
        let mut max_channel = 0;
        let mut max_message = 0;

        for channel in snapshot.channels {
            max_channel = max_channel.max(channel.id);
            for id in channel.log.ids() {
                max_message = max_message.max(id);
                index.insert(id, channel.id);
            }
            channels.insert(channel.id, Arc::new(Mutex::new(channel)));
        }

        info!(
            "Restored {} channels and {} messages from snapshot",
            channels.len(),
            index.len()
        );

        Self {
            directory,
            clock,
            next_channel_id: AtomicU64::new(snapshot.next_channel_id.max(max_channel + 1)),
            next_message_id: AtomicU64::new(snapshot.next_message_id.max(max_message + 1)),
            channels: RwLock::new(channels),
            message_index: RwLock::new(index),
        }
    }

    /// Point-in-time copy of every channel, suitable for persisting.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let mut channels = Vec::new();
        for handle in self.all_channels()? {
            channels.push(lock(&handle)?.clone());
        }
        // Read counters last: anything cloned above has an id below them.
        Ok(StoreSnapshot {
            next_channel_id: self.next_channel_id.load(Ordering::SeqCst),
            next_message_id: self.next_message_id.load(Ordering::SeqCst),
            channels,
        })
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub(crate) fn allocate_channel_id(&self) -> ChannelId {
        self.next_channel_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn insert_channel(&self, channel: Channel) -> Result<()> {
        let id = channel.id;
        self.channels
            .write()
            .map_err(|e| CoreError::Internal(format!("channel table lock poisoned: {e}")))?
            .insert(id, Arc::new(Mutex::new(channel)));
        Ok(())
    }

    pub(crate) fn channel(&self, id: ChannelId) -> Result<ChannelHandle> {
        self.channels
            .read()
            .map_err(|e| CoreError::Internal(format!("channel table lock poisoned: {e}")))?
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("channel {id}")))
    }

    /// Every channel in creation order. The table lock is released on return.
    pub(crate) fn all_channels(&self) -> Result<Vec<ChannelHandle>> {
        Ok(self
            .channels
            .read()
            .map_err(|e| CoreError::Internal(format!("channel table lock poisoned: {e}")))?
            .values()
            .cloned()
            .collect())
    }

    pub(crate) fn channel_of(&self, message: MessageId) -> Result<ChannelId> {
        self.message_index
            .read()
            .map_err(|e| CoreError::Internal(format!("message index lock poisoned: {e}")))?
            .get(&message)
            .copied()
            .ok_or_else(|| CoreError::not_found(format!("message {message}")))
    }

    /// Append a message to a locked channel, assigning the next global id.
    pub(crate) fn commit_message(
        &self,
        channel: &mut Channel,
        author: UserId,
        body: String,
    ) -> Result<MessageId> {
        let mut index = self
            .message_index
            .write()
            .map_err(|e| CoreError::Internal(format!("message index lock poisoned: {e}")))?;
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        channel
            .log
            .push(Message::new(id, author, channel.id, body, self.clock.now()));
        index.insert(id, channel.id);
        debug!("Message {} committed to channel {}", id, channel.id);
        Ok(id)
    }

    pub(crate) fn forget_message(&self, message: MessageId) -> Result<()> {
        self.message_index
            .write()
            .map_err(|e| CoreError::Internal(format!("message index lock poisoned: {e}")))?
            .remove(&message);
        Ok(())
    }
}

pub(crate) fn lock(handle: &Mutex<Channel>) -> Result<MutexGuard<'_, Channel>> {
    handle
        .lock()
        .map_err(|e| CoreError::Internal(format!("channel lock poisoned: {e}")))
}
