use thiserror::Error;

use crate::common::types::TxnId;

/// Errors reported by the lock manager
///
/// A rejected call never leaves the lock table partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("Transaction T{0} not found")]
    UnknownTransaction(TxnId),

    #[error("Transaction T{0} already exists")]
    DuplicateTransaction(TxnId),

    #[error("Transaction T{0} cannot unlock under Strict 2PL; use commit or abort")]
    IllegalEarlyRelease(TxnId),
}

/// Result type for lock manager operations
pub type Result<T> = std::result::Result<T, LockError>;
