use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::store::Store;

/// Serializable image of the whole store, including id counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub next_channel_id: u64,
    pub next_message_id: u64,
    pub channels: Vec<Channel>,
}

/// Where snapshots go. Implementations may block; the loop below calls them
/// off the async runtime.
pub trait SnapshotSink: Send + Sync + 'static {
    fn persist(&self, snapshot: &StoreSnapshot) -> anyhow::Result<()>;
}

/// Background task that persists the store on a fixed interval.
pub async fn run_snapshot_loop(store: Arc<Store>, sink: Arc<dyn SnapshotSink>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        if let Err(e) = persist_once(store.clone(), sink.clone()).await {
            warn!("Snapshot error: {}", e);
        }
    }
}

/// Take and persist one snapshot. Both steps lock and may block, so they run
/// on the blocking pool.
pub async fn persist_once(store: Arc<Store>, sink: Arc<dyn SnapshotSink>) -> anyhow::Result<()> {
    let channels = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let snapshot = store.snapshot()?;
        sink.persist(&snapshot)?;
        Ok(snapshot.channels.len())
    })
    .await??;

    debug!("Snapshot persisted ({} channels)", channels);
    Ok(())
}
