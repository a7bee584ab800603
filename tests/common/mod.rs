#![allow(dead_code)]

use std::sync::Arc;

use twopl::{LockManager, LockManagerConfig, LockTableSnapshot, NullSink};

// Create a lock manager that discards events
pub fn quiet_manager(config: LockManagerConfig) -> LockManager {
    LockManager::with_sink(config, Arc::new(NullSink))
}

// Check the mutual exclusion invariants on a lock table snapshot
pub fn assert_mutual_exclusion(snapshot: &LockTableSnapshot) {
    for holders in snapshot.items() {
        assert!(
            holders.exclusive.len() <= 1,
            "item {} has several exclusive holders: {:?}",
            holders.item,
            holders.exclusive
        );
        if !holders.exclusive.is_empty() {
            assert!(
                holders.shared.is_empty(),
                "item {} is held shared {:?} and exclusive {:?}",
                holders.item,
                holders.shared,
                holders.exclusive
            );
        }
        assert!(
            !holders.shared.is_empty() || !holders.exclusive.is_empty(),
            "item {} is listed without holders",
            holders.item
        );
    }
}
