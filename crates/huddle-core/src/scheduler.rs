use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{info, warn};

use huddle_types::{ChannelId, MessageId, UserId};

use crate::error::{CoreError, Result};
use crate::store::Store;

/// Deferred work against the store: delayed sends and standup deadlines.
///
/// Each job is its own tokio task sleeping until its fire time; nothing
/// blocks the request that scheduled it. Jobs are never cancelled.
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<Store>,
}

impl Scheduler {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn delay_until(&self, at: i64) -> Duration {
        let secs = at.saturating_sub(self.store.now()).max(0);
        Duration::from_secs(secs as u64)
    }

    /// Validate now, post at `time_sent`. The receiver yields the outcome of
    /// the send once it fires; dropping it is fine.
    pub fn send_later(
        &self,
        channel: ChannelId,
        actor: UserId,
        body: String,
        time_sent: i64,
    ) -> Result<oneshot::Receiver<Result<MessageId>>> {
        if time_sent < self.store.now() {
            return Err(CoreError::invalid("time_sent is in the past"));
        }
        self.store.check_can_send(channel, actor, &body)?;

        let delay = self.delay_until(time_sent);
        let store = self.store.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = store.send(channel, actor, &body);
            match &result {
                Ok(id) => info!("Delayed message {} posted to channel {}", id, channel),
                Err(e) => warn!(
                    "Delayed message from user {} to channel {} dropped: {}",
                    actor, channel, e
                ),
            }
            let _ = tx.send(result);
        });

        info!(
            "Scheduled message from user {} to channel {} in {}s",
            actor,
            channel,
            delay.as_secs()
        );
        Ok(rx)
    }

    /// Run the standup expiry check at `finish_at`.
    pub fn watch_standup(&self, channel: ChannelId, finish_at: i64) {
        let delay = self.delay_until(finish_at);
        let store = self.store.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match store.flush_standup_if_due(channel) {
                Ok(Some(id)) => info!("Standup timer committed message {} in channel {}", id, channel),
                Ok(None) => {}
                Err(e) => warn!("Standup timer for channel {} failed: {}", channel, e),
            }
        });
    }
}
