use std::collections::HashMap;

use crate::common::types::TxnId;
use crate::transaction::concurrency::error::{LockError, Result};
use crate::transaction::concurrency::transaction::TransactionRecord;

/// Transaction registry - source of truth for which transactions are active
///
/// Records are removed on commit or abort, which frees the id for reuse.
/// The registry has no locking of its own; the lock manager guards it.
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    transactions: HashMap<TxnId, TransactionRecord>,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new active transaction
    pub fn begin(&mut self, txn_id: TxnId) -> Result<&TransactionRecord> {
        if self.transactions.contains_key(&txn_id) {
            return Err(LockError::DuplicateTransaction(txn_id));
        }
        let record = self
            .transactions
            .entry(txn_id)
            .or_insert_with(|| TransactionRecord::new(txn_id));
        Ok(&*record)
    }

    /// Get an active transaction by ID
    pub fn get(&self, txn_id: TxnId) -> Result<&TransactionRecord> {
        self.transactions
            .get(&txn_id)
            .filter(|record| record.is_active())
            .ok_or(LockError::UnknownTransaction(txn_id))
    }

    pub fn get_mut(&mut self, txn_id: TxnId) -> Result<&mut TransactionRecord> {
        self.transactions
            .get_mut(&txn_id)
            .filter(|record| record.is_active())
            .ok_or(LockError::UnknownTransaction(txn_id))
    }

    /// Remove a transaction, handing the record to the caller
    pub fn remove(&mut self, txn_id: TxnId) -> Option<TransactionRecord> {
        self.transactions.remove(&txn_id)
    }

    pub fn contains(&self, txn_id: TxnId) -> bool {
        self.transactions.contains_key(&txn_id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All registered transaction IDs, sorted
    pub fn ids(&self) -> Vec<TxnId> {
        let mut ids: Vec<TxnId> = self.transactions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
