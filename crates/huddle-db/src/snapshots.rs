use crate::Database;
use anyhow::Result;
use huddle_core::{SnapshotSink, StoreSnapshot};
use rusqlite::OptionalExtension;
use tracing::{debug, info};

/// Older snapshots beyond this many are pruned on every write.
const KEEP_SNAPSHOTS: i64 = 3;

impl Database {
    pub fn save_snapshot(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let body = serde_json::to_string(snapshot)?;

        self.with_conn(|conn| {
            conn.execute("INSERT INTO snapshots (body) VALUES (?1)", [&body])?;
            let pruned = conn.execute(
                "DELETE FROM snapshots WHERE id NOT IN
                    (SELECT id FROM snapshots ORDER BY id DESC LIMIT ?1)",
                [KEEP_SNAPSHOTS],
            )?;
            debug!("Snapshot saved ({} bytes, {} pruned)", body.len(), pruned);
            Ok(())
        })
    }

    pub fn load_latest_snapshot(&self) -> Result<Option<StoreSnapshot>> {
        let body: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT body FROM snapshots ORDER BY id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        match body {
            Some(body) => {
                let snapshot: StoreSnapshot = serde_json::from_str(&body)?;
                info!("Loaded snapshot with {} channels", snapshot.channels.len());
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}

impl SnapshotSink for Database {
    fn persist(&self, snapshot: &StoreSnapshot) -> Result<()> {
        self.save_snapshot(snapshot)
    }
}
