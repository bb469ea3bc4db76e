pub mod channel;
pub mod clock;
pub mod directory;
pub mod error;
pub mod hangman;
pub mod membership;
pub mod message_log;
pub mod messaging;
pub mod reactions;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod standup;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{MemoryDirectory, UserDirectory};
pub use error::{CoreError, Result};
pub use scheduler::Scheduler;
pub use snapshot::{SnapshotSink, StoreSnapshot};
pub use store::Store;
