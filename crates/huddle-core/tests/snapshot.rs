mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use common::{ADA, BOB, fixture};
use huddle_core::snapshot::persist_once;
use huddle_core::{Clock, SnapshotSink, Store, StoreSnapshot};

#[derive(Default)]
struct RecordingSink {
    taken: Mutex<Vec<StoreSnapshot>>,
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, snapshot: &StoreSnapshot) -> anyhow::Result<()> {
        self.taken.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

#[test]
fn restored_store_keeps_state_and_never_reuses_ids() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    let hidden = f.store.create_channel(BOB, "hidden", false).unwrap();
    let first = f.store.send(g, ADA, "kept").unwrap();
    let removed = f.store.send(g, ADA, "removed").unwrap();
    f.store.remove(ADA, removed).unwrap();
    f.store.react(ADA, first, 1).unwrap();
    f.store.pin(ADA, first).unwrap();
    f.store.standup_start(g, ADA, 60).unwrap();
    f.store.standup_send(g, ADA, "in flight").unwrap();

    let json = serde_json::to_string(&f.store.snapshot().unwrap()).unwrap();
    let snapshot: StoreSnapshot = serde_json::from_str(&json).unwrap();
    let restored = Store::from_snapshot(f.directory.clone(), f.clock.clone(), snapshot);

    let page = restored.page(g, ADA, 0).unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].message_id, first);
    assert!(page.messages[0].is_pinned);
    assert_eq!(page.messages[0].reacts[0].u_ids, vec![ADA]);
    assert!(restored.standup_active(g, ADA).unwrap().is_active);
    assert_eq!(
        restored.standup_buffer(g, ADA).unwrap().as_deref(),
        Some("ada: in flight\n")
    );
    assert!(restored.details(BOB, hidden).is_ok());

    // The removed message's id stays retired.
    let next = restored.send(g, ADA, "after restore").unwrap();
    assert!(next > removed);
    let channel = restored.create_channel(ADA, "new", true).unwrap();
    assert!(channel > hidden);

    // The index was rebuilt, so message-addressed operations still work.
    restored.edit(ADA, first, "still here").unwrap();
}

#[test]
fn restore_survives_counters_behind_the_data() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    let id = f.store.send(g, ADA, "hello").unwrap();

    let mut snapshot = f.store.snapshot().unwrap();
    snapshot.next_channel_id = 0;
    snapshot.next_message_id = 0;
    let restored = Store::from_snapshot(f.directory.clone(), f.clock.clone(), snapshot);

    assert!(restored.send(g, ADA, "again").unwrap() > id);
    assert!(restored.create_channel(ADA, "other", true).unwrap() > g);
}

#[tokio::test]
async fn persist_once_hands_the_sink_a_full_snapshot() {
    let f = fixture();
    let g = f.store.create_channel(ADA, "G", true).unwrap();
    f.store.send(g, ADA, "hello").unwrap();

    let sink = Arc::new(RecordingSink::default());
    persist_once(f.store.clone(), sink.clone()).await.unwrap();

    let taken = sink.taken.lock().unwrap();
    assert_eq!(taken.len(), 1);
    assert_eq!(taken[0].channels.len(), 1);
    assert_eq!(taken[0].next_message_id, 2);
}

/// Clock that stalls once, from inside a send, while the channel lock is held.
struct StallingClock {
    armed: AtomicBool,
    entered: Mutex<Option<mpsc::Sender<()>>>,
}

impl Clock for StallingClock {
    fn now(&self) -> i64 {
        if self.armed.swap(false, Ordering::SeqCst) {
            if let Some(tx) = self.entered.lock().unwrap().take() {
                tx.send(()).unwrap();
            }
            thread::sleep(Duration::from_millis(500));
        }
        common::START
    }
}

#[tokio::test]
async fn persist_once_waits_for_channel_locks_off_the_runtime() {
    let f = fixture();
    let (entered_tx, entered_rx) = mpsc::channel();
    let clock = Arc::new(StallingClock {
        armed: AtomicBool::new(false),
        entered: Mutex::new(Some(entered_tx)),
    });
    let store = Arc::new(Store::new(f.directory.clone(), clock.clone()));
    let g = store.create_channel(ADA, "G", true).unwrap();

    clock.armed.store(true, Ordering::SeqCst);
    let sender = {
        let store = store.clone();
        thread::spawn(move || store.send(g, ADA, "slow").unwrap())
    };
    entered_rx.recv().unwrap();

    let sink = Arc::new(RecordingSink::default());
    let mut job = tokio::spawn(persist_once(store.clone(), sink.clone()));

    // The runtime stays free while the snapshot waits on the busy channel.
    let early = tokio::time::timeout(Duration::from_millis(50), &mut job).await;
    assert!(early.is_err());

    job.await.unwrap().unwrap();
    sender.join().unwrap();
    assert_eq!(sink.taken.lock().unwrap().len(), 1);
}
