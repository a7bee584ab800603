// Lock-based concurrency control: Two-Phase Locking and Strict 2PL

pub mod common;
pub mod shell;
pub mod transaction;

// Re-export key items for convenient access
pub use common::types::{ItemId, TxnId};
pub use transaction::concurrency::{
    ChannelSink, EventOutcome, LockError, LockEvent, LockEventSink, LockManager,
    LockManagerConfig, LockMode, LockOperation, LockResult, LockStatistics, LockTableSnapshot,
    LogSink, NullSink, TransactionInfo, TransactionOutcome, TransactionState,
};
