// Structured lock events
//
// Every protocol call on the lock manager produces exactly one `LockEvent`;
// inspection calls produce none.
// Events are handed to a `LockEventSink` after the manager has left its
// critical section, so a slow sink never holds up the lock table.

use std::fmt;
use std::time::{Duration, SystemTime};

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info, warn};

use crate::common::types::{ItemId, TxnId};
use crate::transaction::concurrency::lock_mode::LockMode;

/// Operation that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOperation {
    Begin,
    Lock(LockMode),
    Upgrade,
    Unlock,
    Commit,
    Abort,
}

impl fmt::Display for LockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockOperation::Begin => f.write_str("begin"),
            LockOperation::Lock(mode) => write!(f, "lock({})", mode),
            LockOperation::Upgrade => f.write_str("upgrade"),
            LockOperation::Unlock => f.write_str("unlock"),
            LockOperation::Commit => f.write_str("commit"),
            LockOperation::Abort => f.write_str("abort"),
        }
    }
}

/// What happened as a result of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Transaction registered
    Started,
    /// Lock granted, or already held
    Granted,
    /// Lock not grantable right now; nothing changed
    Denied,
    /// Shared lock converted to exclusive
    Upgraded,
    /// Locks released by `unlock`
    Released { count: usize },
    Committed {
        locks_released: usize,
        duration: Duration,
    },
    Aborted { locks_released: usize },
    /// Abort of an unknown transaction
    NoOp,
    /// Call failed with an error
    Rejected { reason: String },
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Started => f.write_str("started"),
            EventOutcome::Granted => f.write_str("granted"),
            EventOutcome::Denied => f.write_str("denied"),
            EventOutcome::Upgraded => f.write_str("upgraded"),
            EventOutcome::Released { count } => write!(f, "released {}", count),
            EventOutcome::Committed {
                locks_released,
                duration,
            } => write!(
                f,
                "committed, released {} (duration: {:.3}s)",
                locks_released,
                duration.as_secs_f64()
            ),
            EventOutcome::Aborted { locks_released } => {
                write!(f, "aborted, released {}", locks_released)
            }
            EventOutcome::NoOp => f.write_str("no-op"),
            EventOutcome::Rejected { reason } => write!(f, "rejected: {}", reason),
        }
    }
}

/// One lock manager operation and its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEvent {
    /// Strictly increasing per manager, in critical-section order
    pub seq: u64,
    pub timestamp: SystemTime,
    pub operation: LockOperation,
    pub txn_id: TxnId,
    pub item: Option<ItemId>,
    pub outcome: EventOutcome,
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} T{} {}", self.seq, self.txn_id, self.operation)?;
        if let Some(item) = &self.item {
            write!(f, " {}", item)?;
        }
        write!(f, ": {}", self.outcome)
    }
}

/// Consumer of lock events
pub trait LockEventSink: Send + Sync {
    fn record(&self, event: &LockEvent);
}

/// Writes events through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LockEventSink for LogSink {
    fn record(&self, event: &LockEvent) {
        match event.outcome {
            EventOutcome::Denied | EventOutcome::Rejected { .. } => warn!("{}", event),
            EventOutcome::Started
            | EventOutcome::Committed { .. }
            | EventOutcome::Aborted { .. } => info!("{}", event),
            _ => debug!("{}", event),
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LockEventSink for NullSink {
    fn record(&self, _event: &LockEvent) {}
}

/// Forwards events to a channel for an external collector
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<LockEvent>,
}

impl ChannelSink {
    /// Create a sink backed by an unbounded channel
    pub fn unbounded() -> (Self, Receiver<LockEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl LockEventSink for ChannelSink {
    fn record(&self, event: &LockEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.sender.send(event.clone());
    }
}
