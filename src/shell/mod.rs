// Command shell over the lock manager
//
// A tiny line-oriented language used by the `twopl` binary and by tests
// to drive the lock manager from scripts.

pub mod command;
pub mod executor;

use thiserror::Error;

use crate::transaction::concurrency::{LockError, ParseLockModeError};

pub use command::ShellCommand;
pub use executor::{execute, run_script, HELP_TEXT};

/// Errors produced while parsing or running a shell command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid transaction id: {0}")]
    InvalidTxnId(String),

    #[error(transparent)]
    InvalidMode(#[from] ParseLockModeError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Result type for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;
