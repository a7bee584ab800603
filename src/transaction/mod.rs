// Transaction Management Module

pub mod concurrency;

// Public exports
pub use concurrency::{
    LockError, LockManager, LockManagerConfig, LockMode, LockResult, TransactionOutcome,
    TransactionState,
};
