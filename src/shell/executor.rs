use crate::shell::{Result, ShellCommand};
use crate::transaction::concurrency::{LockManager, LockResult};

pub const HELP_TEXT: &str = "\
Available commands:
  begin <tid>                  - Start a transaction
  lock <tid> <item> <S|X>      - Request a shared or exclusive lock
  upgrade <tid> <item>         - Upgrade a shared lock to exclusive
  unlock <tid> <item>          - Release locks on an item (basic 2PL only)
  commit <tid>                 - Commit and release all locks
  abort <tid>                  - Abort and release all locks
  holders <item>               - Show who holds an item
  txn <tid>                    - Show a transaction
  table                        - Show the lock table
  stats                        - Show lock statistics
  help                         - Display this help message
  exit                         - Exit the shell";

/// Run a single command and render its output
pub fn execute(manager: &LockManager, command: &ShellCommand) -> Result<String> {
    let output = match command {
        ShellCommand::Begin(tid) => {
            manager.begin_transaction(*tid)?;
            format!("T{} started", tid)
        }
        ShellCommand::Lock { txn_id, item, mode } => {
            match manager.lock(*txn_id, item, *mode)? {
                LockResult::Granted => format!("T{} granted {} lock on {}", txn_id, mode, item),
                LockResult::Denied => format!("T{} denied {} lock on {}", txn_id, mode, item),
            }
        }
        ShellCommand::Upgrade { txn_id, item } => match manager.upgrade(*txn_id, item)? {
            LockResult::Granted => format!("T{} upgraded lock on {} (S -> X)", txn_id, item),
            LockResult::Denied => format!("T{} upgrade on {} denied", txn_id, item),
        },
        ShellCommand::Unlock { txn_id, item } => {
            let count = manager.unlock(*txn_id, item)?;
            format!("T{} released {} lock(s) on {}", txn_id, count, item)
        }
        ShellCommand::Commit(tid) => {
            let outcome = manager.commit(*tid)?;
            format!("T{} committed (released {} lock(s))", tid, outcome.locks_released)
        }
        ShellCommand::Abort(tid) => match manager.abort(*tid) {
            Some(outcome) => {
                format!("T{} aborted (released {} lock(s))", tid, outcome.locks_released)
            }
            None => format!("T{} not active; nothing to abort", tid),
        },
        ShellCommand::Holders(item) => {
            let holders = manager.holders(item);
            if holders.is_empty() {
                format!("{}: (free)", item)
            } else {
                let list: Vec<String> = holders
                    .iter()
                    .map(|(tid, mode)| format!("T{}({})", tid, mode))
                    .collect();
                format!("{}: {}", item, list.join(", "))
            }
        }
        ShellCommand::Txn(tid) => match manager.transaction(*tid) {
            Some(info) => {
                let locks: Vec<String> = info
                    .locks_held
                    .iter()
                    .map(|(item, mode)| format!("{}:{}", item, mode))
                    .collect();
                let mut line = format!(
                    "T{} {:?} {:?} locks=[{}]",
                    tid,
                    info.state,
                    info.phase,
                    locks.join(", ")
                );
                if let Some((item, mode)) = &info.waiting_for {
                    line.push_str(&format!(" waiting={}:{}", item, mode));
                }
                line
            }
            None => format!("T{} not active", tid),
        },
        ShellCommand::Table => manager.lock_table().to_string(),
        ShellCommand::Stats => manager.statistics().to_string(),
        ShellCommand::Help => HELP_TEXT.to_string(),
        ShellCommand::Exit => String::new(),
    };
    Ok(output)
}

/// Run a multi-line script, stopping at `exit`
///
/// Errors are rendered inline as `error: ...` and do not stop the script.
pub fn run_script(manager: &LockManager, script: &str) -> String {
    let mut lines = Vec::new();
    for line in script.lines() {
        let result = ShellCommand::parse(line).and_then(|command| match command {
            Some(ShellCommand::Exit) => Ok(None),
            Some(command) => execute(manager, &command).map(Some),
            None => Ok(Some(String::new())),
        });
        match result {
            Ok(None) => break,
            Ok(Some(output)) if output.is_empty() => {}
            Ok(Some(output)) => lines.push(output),
            Err(err) => lines.push(format!("error: {}", err)),
        }
    }
    lines.join("\n")
}
