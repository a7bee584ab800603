// Lock manager implementing 2PL and Strict 2PL
//
// All lock table and registry state lives behind one mutex. Every public
// operation runs as a single critical section and never waits for another
// transaction: a conflicting request is answered with `Denied` right away
// and the caller decides whether to retry, back off or abort. There is no
// wait queue and no deadlock detection.

use std::sync::Arc;
use std::time::SystemTime;

use log::warn;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::common::types::TxnId;
use crate::transaction::concurrency::error::{LockError, Result};
use crate::transaction::concurrency::events::{
    EventOutcome, LockEvent, LockEventSink, LockOperation, LogSink,
};
use crate::transaction::concurrency::lock_mode::LockMode;
use crate::transaction::concurrency::lock_table::LockTable;
use crate::transaction::concurrency::registry::TransactionRegistry;
use crate::transaction::concurrency::report::LockTableSnapshot;
use crate::transaction::concurrency::stats::LockStatistics;
use crate::transaction::concurrency::transaction::{
    LockPhase, TransactionInfo, TransactionOutcome, TransactionRecord, TransactionState,
};

/// Configuration for the lock manager
///
/// Fixed for the lifetime of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockManagerConfig {
    /// Hold every lock until commit/abort; `unlock` is rejected.
    pub strict_two_phase: bool,
}

impl LockManagerConfig {
    pub fn strict() -> Self {
        Self {
            strict_two_phase: true,
        }
    }

    pub fn basic() -> Self {
        Self {
            strict_two_phase: false,
        }
    }
}

impl Default for LockManagerConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// Answer to a lock or upgrade request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockResult {
    Granted,
    /// Conflicts with another holder; nothing was changed
    Denied,
}

impl LockResult {
    pub fn is_granted(self) -> bool {
        self == LockResult::Granted
    }
}

/// How a request was resolved inside the critical section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquisition {
    AlreadyHeld,
    Granted,
    Upgraded,
    Denied,
}

impl Acquisition {
    fn result(self) -> LockResult {
        match self {
            Acquisition::Denied => LockResult::Denied,
            _ => LockResult::Granted,
        }
    }

    fn outcome(self) -> EventOutcome {
        match self {
            Acquisition::AlreadyHeld | Acquisition::Granted => EventOutcome::Granted,
            Acquisition::Upgraded => EventOutcome::Upgraded,
            Acquisition::Denied => EventOutcome::Denied,
        }
    }
}

/// Everything guarded by the manager's mutex
#[derive(Debug, Default)]
struct ManagerState {
    table: LockTable,
    registry: TransactionRegistry,
    stats: LockStatistics,
    next_seq: u64,
}

fn warn_if_shrinking(record: &TransactionRecord, item: &str) {
    if record.phase() == LockPhase::Shrinking {
        warn!(
            "T{} acquired a lock on {} after releasing one; two-phase rule violated",
            record.id(),
            item
        );
    }
}

impl ManagerState {
    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn acquire(&mut self, txn_id: TxnId, item: &str, mode: LockMode) -> Result<Acquisition> {
        if let Some(held) = self.registry.get(txn_id)?.mode_on(item) {
            if held.covers(mode) {
                return Ok(Acquisition::AlreadyHeld);
            }
            // Holding shared and asking for exclusive
            return self.upgrade(txn_id, item);
        }

        if !self.table.can_grant(txn_id, item, mode) {
            self.registry.get_mut(txn_id)?.set_waiting(item, mode);
            self.stats.record_wait();
            return Ok(Acquisition::Denied);
        }

        self.table.grant(txn_id, item, mode);
        let record = self.registry.get_mut(txn_id)?;
        record.add_lock(item, mode);
        warn_if_shrinking(record, item);
        self.stats.record_grant();
        Ok(Acquisition::Granted)
    }

    fn upgrade(&mut self, txn_id: TxnId, item: &str) -> Result<Acquisition> {
        match self.registry.get(txn_id)?.mode_on(item) {
            Some(LockMode::Exclusive) => Ok(Acquisition::AlreadyHeld),
            Some(LockMode::Shared) => {
                let record = self.registry.get_mut(txn_id)?;
                if !self.table.upgrade(txn_id, item) {
                    return Ok(Acquisition::Denied);
                }
                record.upgrade_lock(item);
                warn_if_shrinking(record, item);
                self.stats.record_upgrade();
                Ok(Acquisition::Upgraded)
            }
            // Nothing to upgrade
            None => Ok(Acquisition::Denied),
        }
    }

    fn release_item(&mut self, txn_id: TxnId, item: &str) -> Result<usize> {
        let record = self.registry.get_mut(txn_id)?;
        let mut released = 0;
        for mode in LockMode::ALL {
            if record.remove_lock(item, mode) {
                self.table.release(txn_id, item, mode);
                released += 1;
            }
        }
        if released > 0 {
            record.enter_shrinking();
        }
        Ok(released)
    }

    /// Releases every lock of `txn_id` and drops it from the registry
    fn finish(&mut self, txn_id: TxnId, state: TransactionState) -> Option<TransactionOutcome> {
        let mut record = self.registry.remove(txn_id)?;
        let locks = record.finish(state);
        for (item, mode) in &locks {
            self.table.release(txn_id, item, *mode);
        }
        match state {
            TransactionState::Committed => self.stats.record_commit(),
            TransactionState::Aborted => self.stats.record_abort(),
            TransactionState::Active => {}
        }
        Some(TransactionOutcome {
            id: txn_id,
            state,
            locks_released: locks.len(),
            duration: record.age(),
        })
    }
}

fn rejected(err: &LockError) -> EventOutcome {
    EventOutcome::Rejected {
        reason: err.to_string(),
    }
}

/// Lock manager - sole owner of the lock table and transaction registry
pub struct LockManager {
    config: LockManagerConfig,
    state: Mutex<ManagerState>,
    sink: Arc<dyn LockEventSink>,
}

impl LockManager {
    /// Create a lock manager that reports events through `log`
    pub fn new(config: LockManagerConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Create a lock manager reporting events to `sink`
    pub fn with_sink(config: LockManagerConfig, sink: Arc<dyn LockEventSink>) -> Self {
        Self {
            config,
            state: Mutex::new(ManagerState::default()),
            sink,
        }
    }

    pub fn config(&self) -> LockManagerConfig {
        self.config
    }

    pub fn is_strict(&self) -> bool {
        self.config.strict_two_phase
    }

    /// Assigns the event sequence number, leaves the critical section and
    /// then hands the event to the sink.
    fn publish(
        &self,
        mut state: MutexGuard<'_, ManagerState>,
        operation: LockOperation,
        txn_id: TxnId,
        item: Option<&str>,
        outcome: EventOutcome,
    ) {
        let seq = state.take_seq();
        drop(state);
        self.sink.record(&LockEvent {
            seq,
            timestamp: SystemTime::now(),
            operation,
            txn_id,
            item: item.map(str::to_string),
            outcome,
        });
    }

    /// Begin a new transaction with a caller-chosen ID
    ///
    /// Fails with `DuplicateTransaction` while a transaction with the same
    /// ID is still active. IDs of finished transactions may be reused.
    pub fn begin_transaction(&self, txn_id: TxnId) -> Result<()> {
        let mut state = self.state.lock();
        let result = state.registry.begin(txn_id).map(|_| ());
        let outcome = match &result {
            Ok(()) => EventOutcome::Started,
            Err(e) => rejected(e),
        };
        self.publish(state, LockOperation::Begin, txn_id, None, outcome);
        result
    }

    /// Request a lock on `item`
    ///
    /// Never blocks. Re-requesting a mode that is already covered is granted
    /// without changes, and asking for exclusive while holding shared goes
    /// through [`LockManager::upgrade`].
    pub fn lock(&self, txn_id: TxnId, item: &str, mode: LockMode) -> Result<LockResult> {
        let mut state = self.state.lock();
        let result = state.acquire(txn_id, item, mode);
        let outcome = match &result {
            Ok(acquisition) => acquisition.outcome(),
            Err(e) => rejected(e),
        };
        self.publish(state, LockOperation::Lock(mode), txn_id, Some(item), outcome);
        result.map(Acquisition::result)
    }

    /// Convert a shared lock on `item` into an exclusive one
    ///
    /// Only succeeds when `txn_id` is the sole holder. On denial the shared
    /// lock stays in place.
    pub fn upgrade(&self, txn_id: TxnId, item: &str) -> Result<LockResult> {
        let mut state = self.state.lock();
        let result = state.upgrade(txn_id, item);
        let outcome = match &result {
            Ok(acquisition) => acquisition.outcome(),
            Err(e) => rejected(e),
        };
        self.publish(state, LockOperation::Upgrade, txn_id, Some(item), outcome);
        result.map(Acquisition::result)
    }

    /// Release every lock `txn_id` holds on `item` (basic 2PL only)
    ///
    /// Returns the number of locks released. Under Strict 2PL this always
    /// fails with `IllegalEarlyRelease`.
    pub fn unlock(&self, txn_id: TxnId, item: &str) -> Result<usize> {
        let mut state = self.state.lock();
        let result = if self.config.strict_two_phase {
            Err(LockError::IllegalEarlyRelease(txn_id))
        } else {
            state.release_item(txn_id, item)
        };
        let outcome = match &result {
            Ok(count) => EventOutcome::Released { count: *count },
            Err(e) => rejected(e),
        };
        self.publish(state, LockOperation::Unlock, txn_id, Some(item), outcome);
        result
    }

    /// Commit a transaction, releasing all of its locks
    pub fn commit(&self, txn_id: TxnId) -> Result<TransactionOutcome> {
        let mut state = self.state.lock();
        let result = state
            .finish(txn_id, TransactionState::Committed)
            .ok_or(LockError::UnknownTransaction(txn_id));
        let outcome = match &result {
            Ok(done) => EventOutcome::Committed {
                locks_released: done.locks_released,
                duration: done.duration,
            },
            Err(e) => rejected(e),
        };
        self.publish(state, LockOperation::Commit, txn_id, None, outcome);
        result
    }

    /// Abort a transaction, releasing all of its locks
    ///
    /// Aborting an unknown transaction is a no-op and returns `None`.
    pub fn abort(&self, txn_id: TxnId) -> Option<TransactionOutcome> {
        let mut state = self.state.lock();
        let result = state.finish(txn_id, TransactionState::Aborted);
        let outcome = match &result {
            Some(done) => EventOutcome::Aborted {
                locks_released: done.locks_released,
            },
            None => EventOutcome::NoOp,
        };
        self.publish(state, LockOperation::Abort, txn_id, None, outcome);
        result
    }

    /// Ordered snapshot of the lock table
    pub fn lock_table(&self) -> LockTableSnapshot {
        self.state.lock().table.snapshot()
    }

    pub fn statistics(&self) -> LockStatistics {
        self.state.lock().stats
    }

    /// Every (transaction, mode) pair currently held on `item`
    pub fn holders(&self, item: &str) -> Vec<(TxnId, LockMode)> {
        self.state.lock().table.holders(item)
    }

    pub fn transaction(&self, txn_id: TxnId) -> Option<TransactionInfo> {
        self.state
            .lock()
            .registry
            .get(txn_id)
            .ok()
            .map(TransactionRecord::info)
    }

    pub fn is_active(&self, txn_id: TxnId) -> bool {
        self.state.lock().registry.contains(txn_id)
    }

    /// IDs of all active transactions, sorted
    pub fn active_transactions(&self) -> Vec<TxnId> {
        self.state.lock().registry.ids()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new(LockManagerConfig::default())
    }
}
