#[path = "../common/mod.rs"]
mod common;

use common::quiet_manager;
use twopl::shell::run_script;
use twopl::LockManagerConfig;

#[test]
fn test_script_shared_compatibility() {
    let lm = quiet_manager(LockManagerConfig::strict());
    let script = "\
        # two readers and a writer on another item
        begin 1
        begin 2
        lock 1 A S
        lock 2 A S
        lock 2 B X
        table
        commit 1
        commit 2
        stats";

    let output = run_script(&lm, script);
    let expected = "\
T1 started
T2 started
T1 granted S lock on A
T2 granted S lock on A
T2 granted X lock on B
LOCK TABLE
A: S[T1, T2]
B: X[T2]
T1 committed (released 1 lock(s))
T2 committed (released 2 lock(s))
STATISTICS
granted: 3
waited: 0
aborted: 0
committed: 2
upgraded: 0";
    assert_eq!(output, expected);
}

#[test]
fn test_script_circular_wait() {
    let lm = quiet_manager(LockManagerConfig::strict());
    let output = run_script(
        &lm,
        "begin 1\nbegin 2\nlock 1 A X\nlock 2 B X\nlock 1 B X\nlock 2 A X\ntable",
    );

    assert!(output.contains("T1 denied X lock on B"));
    assert!(output.contains("T2 denied X lock on A"));
    assert!(output.ends_with("LOCK TABLE\nA: X[T1]\nB: X[T2]"));
    assert_eq!(lm.active_transactions(), vec![1, 2]);
}

#[test]
fn test_script_basic_mode_unlock() {
    let lm = quiet_manager(LockManagerConfig::basic());
    let output = run_script(
        &lm,
        "begin 1\nlock 1 A S\nupgrade 1 A\nunlock 1 A\nholders A\ntxn 1\nabort 1\nabort 1",
    );

    let expected = "\
T1 started
T1 granted S lock on A
T1 upgraded lock on A (S -> X)
T1 released 1 lock(s) on A
A: (free)
T1 Active Shrinking locks=[]
T1 aborted (released 0 lock(s))
T1 not active; nothing to abort";
    assert_eq!(output, expected);
}

#[test]
fn test_script_errors_continue() {
    let lm = quiet_manager(LockManagerConfig::strict());
    let output = run_script(&lm, "lock 99 A S\nfrobnicate\nlock 1 A\nbegin 1\ncommit 1");

    let expected = "\
error: Transaction T99 not found
error: Unknown command: frobnicate
error: Usage: lock <tid> <item> <S|X>
T1 started
T1 committed (released 0 lock(s))";
    assert_eq!(output, expected);
}
