#[path = "../common/mod.rs"]
mod common;

use common::{assert_mutual_exclusion, quiet_manager};
use twopl::{LockError, LockManagerConfig, LockMode, LockResult, LockStatistics, TransactionState};

#[test]
fn test_shared_locks_then_commit() {
    let lm = quiet_manager(LockManagerConfig::strict());

    lm.begin_transaction(1).unwrap();
    lm.begin_transaction(2).unwrap();
    assert_eq!(lm.lock(1, "A", LockMode::Shared), Ok(LockResult::Granted));
    assert_eq!(lm.lock(2, "A", LockMode::Shared), Ok(LockResult::Granted));
    assert_eq!(lm.lock(2, "B", LockMode::Exclusive), Ok(LockResult::Granted));

    assert_eq!(lm.lock_table().to_string(), "LOCK TABLE\nA: S[T1, T2]\nB: X[T2]");
    assert_mutual_exclusion(&lm.lock_table());

    lm.commit(1).unwrap();
    lm.commit(2).unwrap();

    assert!(lm.lock_table().is_empty());
    let stats = lm.statistics();
    assert_eq!(stats.granted, 3);
    assert_eq!(stats.waited, 0);
    assert_eq!(stats.committed, 2);
    assert_eq!(
        stats.to_string(),
        "STATISTICS\ngranted: 3\nwaited: 0\naborted: 0\ncommitted: 2\nupgraded: 0"
    );
}

#[test]
fn test_circular_wait_is_not_resolved() {
    let lm = quiet_manager(LockManagerConfig::strict());

    lm.begin_transaction(1).unwrap();
    lm.begin_transaction(2).unwrap();
    assert_eq!(lm.lock(1, "A", LockMode::Exclusive), Ok(LockResult::Granted));
    assert_eq!(lm.lock(2, "B", LockMode::Exclusive), Ok(LockResult::Granted));
    assert_eq!(lm.lock(1, "B", LockMode::Exclusive), Ok(LockResult::Denied));
    assert_eq!(lm.lock(2, "A", LockMode::Exclusive), Ok(LockResult::Denied));

    // Both stay active holding their own locks
    assert_eq!(lm.active_transactions(), vec![1, 2]);
    assert_eq!(lm.holders("A"), vec![(1, LockMode::Exclusive)]);
    assert_eq!(lm.holders("B"), vec![(2, LockMode::Exclusive)]);
    assert_eq!(lm.statistics().waited, 2);

    // Retrying does not help until someone aborts
    assert_eq!(lm.lock(1, "B", LockMode::Exclusive), Ok(LockResult::Denied));

    let aborted = lm.abort(2).unwrap();
    assert_eq!(aborted.state, TransactionState::Aborted);
    assert_eq!(aborted.locks_released, 1);

    assert_eq!(lm.lock(1, "B", LockMode::Exclusive), Ok(LockResult::Granted));
    assert_eq!(lm.statistics().aborted, 1);
    assert!(lm.transaction(1).unwrap().waiting_for.is_none());
}

#[test]
fn test_upgrade_sole_reader() {
    let lm = quiet_manager(LockManagerConfig::strict());

    lm.begin_transaction(1).unwrap();
    assert_eq!(lm.lock(1, "A", LockMode::Shared), Ok(LockResult::Granted));
    assert_eq!(lm.upgrade(1, "A"), Ok(LockResult::Granted));

    let snapshot = lm.lock_table();
    let a = snapshot.get("A").unwrap();
    assert!(a.shared.is_empty());
    assert_eq!(a.exclusive, vec![1]);
    assert_eq!(
        lm.transaction(1).unwrap().locks_held,
        vec![("A".to_string(), LockMode::Exclusive)]
    );
}

#[test]
fn test_upgrade_blocked_by_other_reader() {
    let lm = quiet_manager(LockManagerConfig::strict());
    lm.begin_transaction(1).unwrap();
    lm.begin_transaction(2).unwrap();

    lm.lock(1, "A", LockMode::Shared).unwrap();
    lm.lock(2, "A", LockMode::Shared).unwrap();
    let stats_before = lm.statistics();

    // Neither reader can upgrade while the other holds shared
    assert_eq!(lm.lock(1, "A", LockMode::Exclusive), Ok(LockResult::Denied));
    assert_eq!(lm.upgrade(2, "A"), Ok(LockResult::Denied));
    assert_mutual_exclusion(&lm.lock_table());

    // Denied upgrades change neither the counters nor the waiting markers
    assert_eq!(lm.statistics(), stats_before);
    assert_eq!(lm.statistics().waited, 0);
    assert!(lm.transaction(1).unwrap().waiting_for.is_none());
    assert!(lm.transaction(2).unwrap().waiting_for.is_none());

    lm.commit(2).unwrap();
    assert_eq!(lm.upgrade(1, "A"), Ok(LockResult::Granted));
    assert_eq!(lm.holders("A"), vec![(1, LockMode::Exclusive)]);
}

#[test]
fn test_strict_mode_keeps_locks_until_commit() {
    let lm = quiet_manager(LockManagerConfig::strict());

    lm.begin_transaction(1).unwrap();
    lm.lock(1, "A", LockMode::Shared).unwrap();

    assert_eq!(lm.unlock(1, "A"), Err(LockError::IllegalEarlyRelease(1)));
    assert_eq!(lm.holders("A"), vec![(1, LockMode::Shared)]);

    lm.commit(1).unwrap();
    assert!(lm.holders("A").is_empty());
}

#[test]
fn test_basic_mode_early_release() {
    let lm = quiet_manager(LockManagerConfig::basic());
    lm.begin_transaction(1).unwrap();
    lm.begin_transaction(2).unwrap();

    lm.lock(1, "A", LockMode::Exclusive).unwrap();
    assert_eq!(lm.lock(2, "A", LockMode::Shared), Ok(LockResult::Denied));

    assert_eq!(lm.unlock(1, "A"), Ok(1));
    assert_eq!(lm.lock(2, "A", LockMode::Shared), Ok(LockResult::Granted));
    assert!(lm.is_active(1));
}

#[test]
fn test_lock_without_begin() {
    let lm = quiet_manager(LockManagerConfig::strict());

    assert_eq!(
        lm.lock(99, "A", LockMode::Shared),
        Err(LockError::UnknownTransaction(99))
    );
    assert_eq!(lm.commit(99), Err(LockError::UnknownTransaction(99)));
    assert!(lm.abort(99).is_none());

    assert!(lm.lock_table().is_empty());
    assert_eq!(lm.statistics(), LockStatistics::default());
}

#[test]
fn test_rejected_calls_do_not_mutate_table() {
    let lm = quiet_manager(LockManagerConfig::strict());
    lm.begin_transaction(1).unwrap();
    lm.lock(1, "A", LockMode::Exclusive).unwrap();
    let before = lm.lock_table();

    assert!(lm.begin_transaction(1).is_err());
    assert!(lm.lock(2, "A", LockMode::Shared).is_err());
    assert!(lm.unlock(1, "A").is_err());
    assert!(lm.upgrade(3, "A").is_err());

    assert_eq!(lm.lock_table(), before);
}

#[test]
fn test_release_completeness_on_abort() {
    let lm = quiet_manager(LockManagerConfig::strict());
    lm.begin_transaction(1).unwrap();
    lm.begin_transaction(2).unwrap();

    for item in ["A", "B", "C", "D"] {
        lm.lock(1, item, LockMode::Shared).unwrap();
    }
    lm.lock(2, "A", LockMode::Shared).unwrap();
    lm.lock(1, "E", LockMode::Exclusive).unwrap();

    assert_eq!(lm.abort(1).unwrap().locks_released, 5);

    let snapshot = lm.lock_table();
    for holders in snapshot.items() {
        assert!(!holders.shared.contains(&1));
        assert!(!holders.exclusive.contains(&1));
    }
    assert_eq!(snapshot.to_string(), "LOCK TABLE\nA: S[T2]");
}

#[test]
fn test_transaction_id_reuse() {
    let lm = quiet_manager(LockManagerConfig::strict());

    lm.begin_transaction(1).unwrap();
    lm.lock(1, "A", LockMode::Exclusive).unwrap();
    assert_eq!(lm.begin_transaction(1), Err(LockError::DuplicateTransaction(1)));

    lm.commit(1).unwrap();
    lm.begin_transaction(1).unwrap();

    // The new incarnation starts without locks
    assert!(lm.transaction(1).unwrap().locks_held.is_empty());
    assert!(lm.lock_table().is_empty());
}
