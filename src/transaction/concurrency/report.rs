// Diagnostic rendering of the lock table and counters
//
// The text layout is stable; tests compare it verbatim.

use std::fmt;

use serde::Serialize;

use crate::common::types::{ItemId, TxnId};
use crate::transaction::concurrency::stats::LockStatistics;

/// Holders of one item at the time of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemHolders {
    pub item: ItemId,
    /// Sorted ascending
    pub shared: Vec<TxnId>,
    /// Sorted ascending
    pub exclusive: Vec<TxnId>,
}

/// Point-in-time copy of the lock table, ordered by item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockTableSnapshot {
    items: Vec<ItemHolders>,
}

impl LockTableSnapshot {
    pub(crate) fn new(items: Vec<ItemHolders>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ItemHolders] {
        &self.items
    }

    pub fn get(&self, item: &str) -> Option<&ItemHolders> {
        self.items.iter().find(|holders| holders.item == item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn write_txn_list(f: &mut fmt::Formatter<'_>, code: &str, tids: &[TxnId]) -> fmt::Result {
    write!(f, "{}[", code)?;
    for (i, tid) in tids.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "T{}", tid)?;
    }
    f.write_str("]")
}

impl fmt::Display for ItemHolders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.item)?;
        if !self.shared.is_empty() {
            f.write_str(" ")?;
            write_txn_list(f, "S", &self.shared)?;
        }
        if !self.exclusive.is_empty() {
            f.write_str(" ")?;
            write_txn_list(f, "X", &self.exclusive)?;
        }
        Ok(())
    }
}

impl fmt::Display for LockTableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LOCK TABLE")?;
        if self.items.is_empty() {
            return f.write_str("\n(empty)");
        }
        for holders in &self.items {
            write!(f, "\n{}", holders)?;
        }
        Ok(())
    }
}

impl fmt::Display for LockStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STATISTICS")?;
        writeln!(f, "granted: {}", self.granted)?;
        writeln!(f, "waited: {}", self.waited)?;
        writeln!(f, "aborted: {}", self.aborted)?;
        writeln!(f, "committed: {}", self.committed)?;
        write!(f, "upgraded: {}", self.upgraded)
    }
}
