// Transaction record tracked by the lock manager

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::common::types::{ItemId, TxnId};
use crate::transaction::concurrency::lock_mode::LockMode;

/// Transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

/// Two-phase locking phase of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockPhase {
    /// Only acquiring locks so far
    Growing,
    /// At least one lock was released early
    Shrinking,
}

/// Per-transaction lock state
///
/// Owned by the registry and only touched inside the lock manager's
/// critical section.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    id: TxnId,
    state: TransactionState,
    phase: LockPhase,
    locks_held: BTreeSet<(ItemId, LockMode)>,
    /// Last request that was denied, cleared on the next grant
    waiting_for: Option<(ItemId, LockMode)>,
    created_at: Instant,
}

impl TransactionRecord {
    pub fn new(id: TxnId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            phase: LockPhase::Growing,
            locks_held: BTreeSet::new(),
            waiting_for: None,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> TxnId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn phase(&self) -> LockPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Time elapsed since the transaction began
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn locks_held(&self) -> &BTreeSet<(ItemId, LockMode)> {
        &self.locks_held
    }

    pub fn holds(&self, item: &str, mode: LockMode) -> bool {
        self.locks_held.contains(&(item.to_string(), mode))
    }

    /// Strongest mode held on `item`
    pub fn mode_on(&self, item: &str) -> Option<LockMode> {
        LockMode::ALL
            .iter()
            .rev()
            .copied()
            .find(|&mode| self.holds(item, mode))
    }

    pub fn waiting_for(&self) -> Option<&(ItemId, LockMode)> {
        self.waiting_for.as_ref()
    }

    pub(crate) fn add_lock(&mut self, item: &str, mode: LockMode) {
        self.locks_held.insert((item.to_string(), mode));
        self.waiting_for = None;
    }

    pub(crate) fn remove_lock(&mut self, item: &str, mode: LockMode) -> bool {
        self.locks_held.remove(&(item.to_string(), mode))
    }

    /// Replaces a shared lock on `item` with an exclusive one
    pub(crate) fn upgrade_lock(&mut self, item: &str) {
        self.remove_lock(item, LockMode::Shared);
        self.add_lock(item, LockMode::Exclusive);
    }

    pub(crate) fn set_waiting(&mut self, item: &str, mode: LockMode) {
        self.waiting_for = Some((item.to_string(), mode));
    }

    pub(crate) fn enter_shrinking(&mut self) {
        self.phase = LockPhase::Shrinking;
    }

    /// Moves the record to a terminal state and hands back every lock it held
    pub(crate) fn finish(&mut self, state: TransactionState) -> BTreeSet<(ItemId, LockMode)> {
        self.state = state;
        self.waiting_for = None;
        std::mem::take(&mut self.locks_held)
    }

    pub fn info(&self) -> TransactionInfo {
        TransactionInfo {
            id: self.id,
            state: self.state,
            phase: self.phase,
            locks_held: self.locks_held.iter().cloned().collect(),
            waiting_for: self.waiting_for.clone(),
            age: self.age(),
        }
    }
}

/// Snapshot of a transaction for inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionInfo {
    pub id: TxnId,
    pub state: TransactionState,
    pub phase: LockPhase,
    /// Sorted by item, then mode
    pub locks_held: Vec<(ItemId, LockMode)>,
    pub waiting_for: Option<(ItemId, LockMode)>,
    pub age: Duration,
}

/// Result of committing or aborting a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionOutcome {
    pub id: TxnId,
    pub state: TransactionState,
    pub locks_released: usize,
    pub duration: Duration,
}
