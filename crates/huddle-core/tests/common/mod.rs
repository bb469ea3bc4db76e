#![allow(dead_code)]

use std::sync::Arc;

use huddle_core::{ManualClock, MemoryDirectory, Store};

/// Global owner (first registered user).
pub const ADA: u64 = 1;
pub const BOB: u64 = 2;
pub const CY: u64 = 3;

pub const START: i64 = 1_587_000_000;

pub struct Fixture {
    pub store: Arc<Store>,
    pub clock: Arc<ManualClock>,
    pub directory: Arc<MemoryDirectory>,
}

pub fn fixture() -> Fixture {
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(ADA, "ada", true).unwrap();
    directory.insert(BOB, "bob", false).unwrap();
    directory.insert(CY, "cy", false).unwrap();

    let clock = Arc::new(ManualClock::new(START));
    let store = Arc::new(Store::new(directory.clone(), clock.clone()));

    Fixture {
        store,
        clock,
        directory,
    }
}
