// Lock-based concurrency control exports

pub mod error;
pub mod events;
pub mod lock_manager;
pub mod lock_mode;
pub mod lock_table;
pub mod registry;
pub mod report;
pub mod stats;
pub mod transaction;

// Public exports
pub use error::{LockError, Result};
pub use events::{ChannelSink, EventOutcome, LockEvent, LockEventSink, LockOperation, LogSink, NullSink};
pub use lock_manager::{LockManager, LockManagerConfig, LockResult};
pub use lock_mode::{LockMode, ParseLockModeError};
pub use report::{ItemHolders, LockTableSnapshot};
pub use stats::LockStatistics;
pub use transaction::{LockPhase, TransactionInfo, TransactionOutcome, TransactionState};
