// Lock table: item -> holders per lock mode

use std::collections::{BTreeSet, HashMap};

use crate::common::types::{ItemId, TxnId};
use crate::transaction::concurrency::lock_mode::LockMode;
use crate::transaction::concurrency::report::{ItemHolders, LockTableSnapshot};

/// Holders of a single item
///
/// Outside of `upgrade`, at most one transaction is in `exclusive`, and
/// `shared` is empty whenever `exclusive` is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockTableEntry {
    shared: BTreeSet<TxnId>,
    exclusive: BTreeSet<TxnId>,
}

impl LockTableEntry {
    /// Transactions holding the item in `mode`
    pub fn holders(&self, mode: LockMode) -> &BTreeSet<TxnId> {
        match mode {
            LockMode::Shared => &self.shared,
            LockMode::Exclusive => &self.exclusive,
        }
    }

    fn holders_mut(&mut self, mode: LockMode) -> &mut BTreeSet<TxnId> {
        match mode {
            LockMode::Shared => &mut self.shared,
            LockMode::Exclusive => &mut self.exclusive,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.exclusive.is_empty()
    }

    /// Mode `txn_id` holds on this item, if any
    pub fn mode_of(&self, txn_id: TxnId) -> Option<LockMode> {
        if self.exclusive.contains(&txn_id) {
            Some(LockMode::Exclusive)
        } else if self.shared.contains(&txn_id) {
            Some(LockMode::Shared)
        } else {
            None
        }
    }

    /// Whether `requested` can be granted to `txn_id` given every other
    /// holder of the item.
    pub fn can_grant(&self, txn_id: TxnId, requested: LockMode) -> bool {
        LockMode::ALL.iter().all(|&held| {
            held.is_compatible_with(requested)
                || self.holders(held).iter().all(|&holder| holder == txn_id)
        })
    }

    /// `txn_id` is the sole shared holder and nobody holds the item exclusively.
    pub fn can_upgrade(&self, txn_id: TxnId) -> bool {
        self.exclusive.is_empty() && self.shared.len() == 1 && self.shared.contains(&txn_id)
    }

    pub fn insert(&mut self, txn_id: TxnId, mode: LockMode) -> bool {
        self.holders_mut(mode).insert(txn_id)
    }

    pub fn remove(&mut self, txn_id: TxnId, mode: LockMode) -> bool {
        self.holders_mut(mode).remove(&txn_id)
    }
}

/// Mapping from item to its current holders
///
/// Items with no holders are dropped from the map.
#[derive(Debug, Default)]
pub struct LockTable {
    entries: HashMap<ItemId, LockTableEntry>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, item: &str) -> Option<&LockTableEntry> {
        self.entries.get(item)
    }

    /// Number of items with at least one holder
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_grant(&self, txn_id: TxnId, item: &str, mode: LockMode) -> bool {
        self.entries
            .get(item)
            .is_none_or(|entry| entry.can_grant(txn_id, mode))
    }

    pub fn grant(&mut self, txn_id: TxnId, item: &str, mode: LockMode) {
        self.entries
            .entry(item.to_string())
            .or_default()
            .insert(txn_id, mode);
    }

    /// Removes `txn_id` from the `mode` holders of `item`. Returns whether
    /// it was there.
    pub fn release(&mut self, txn_id: TxnId, item: &str, mode: LockMode) -> bool {
        let Some(entry) = self.entries.get_mut(item) else {
            return false;
        };
        let removed = entry.remove(txn_id, mode);
        if entry.is_empty() {
            self.entries.remove(item);
        }
        removed
    }

    /// Moves `txn_id` from the shared to the exclusive holders of `item` if
    /// it is the only holder. Leaves the table untouched otherwise.
    pub fn upgrade(&mut self, txn_id: TxnId, item: &str) -> bool {
        match self.entries.get_mut(item) {
            Some(entry) if entry.can_upgrade(txn_id) => {
                entry.remove(txn_id, LockMode::Shared);
                entry.insert(txn_id, LockMode::Exclusive);
                true
            }
            _ => false,
        }
    }

    /// Every (transaction, mode) pair on `item`, sorted
    pub fn holders(&self, item: &str) -> Vec<(TxnId, LockMode)> {
        let Some(entry) = self.entries.get(item) else {
            return Vec::new();
        };
        let mut holders: Vec<(TxnId, LockMode)> = LockMode::ALL
            .iter()
            .flat_map(|&mode| entry.holders(mode).iter().map(move |&tid| (tid, mode)))
            .collect();
        holders.sort();
        holders
    }

    /// Whether `txn_id` appears anywhere in the table
    pub fn references(&self, txn_id: TxnId) -> bool {
        self.entries
            .values()
            .any(|entry| entry.mode_of(txn_id).is_some())
    }

    /// Ordered copy of the table for diagnostics
    pub fn snapshot(&self) -> LockTableSnapshot {
        let mut items: Vec<ItemHolders> = self
            .entries
            .iter()
            .map(|(item, entry)| ItemHolders {
                item: item.clone(),
                shared: entry.holders(LockMode::Shared).iter().copied().collect(),
                exclusive: entry.holders(LockMode::Exclusive).iter().copied().collect(),
            })
            .collect();
        items.sort_by(|a, b| a.item.cmp(&b.item));
        LockTableSnapshot::new(items)
    }
}
