use crate::common::types::{ItemId, TxnId};
use crate::shell::{Result, ShellError};
use crate::transaction::concurrency::LockMode;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Begin(TxnId),
    Lock {
        txn_id: TxnId,
        item: ItemId,
        mode: LockMode,
    },
    Upgrade {
        txn_id: TxnId,
        item: ItemId,
    },
    Unlock {
        txn_id: TxnId,
        item: ItemId,
    },
    Commit(TxnId),
    Abort(TxnId),
    Holders(ItemId),
    Txn(TxnId),
    Table,
    Stats,
    Help,
    Exit,
}

/// Accepts "7" as well as "T7" / "t7"
fn parse_txn_id(token: &str) -> Result<TxnId> {
    let digits = token
        .strip_prefix('T')
        .or_else(|| token.strip_prefix('t'))
        .unwrap_or(token);
    digits
        .parse::<TxnId>()
        .map_err(|_| ShellError::InvalidTxnId(token.to_string()))
}

impl ShellCommand {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<ShellCommand>> {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match (keyword.to_lowercase().as_str(), args) {
            ("begin", [tid]) => ShellCommand::Begin(parse_txn_id(tid)?),
            ("begin", _) => return Err(ShellError::Usage("begin <tid>")),

            ("lock", [tid, item, mode]) => ShellCommand::Lock {
                txn_id: parse_txn_id(tid)?,
                item: item.to_string(),
                mode: mode.parse()?,
            },
            ("lock", _) => return Err(ShellError::Usage("lock <tid> <item> <S|X>")),

            ("upgrade", [tid, item]) => ShellCommand::Upgrade {
                txn_id: parse_txn_id(tid)?,
                item: item.to_string(),
            },
            ("upgrade", _) => return Err(ShellError::Usage("upgrade <tid> <item>")),

            ("unlock", [tid, item]) => ShellCommand::Unlock {
                txn_id: parse_txn_id(tid)?,
                item: item.to_string(),
            },
            ("unlock", _) => return Err(ShellError::Usage("unlock <tid> <item>")),

            ("commit", [tid]) => ShellCommand::Commit(parse_txn_id(tid)?),
            ("commit", _) => return Err(ShellError::Usage("commit <tid>")),

            ("abort", [tid]) => ShellCommand::Abort(parse_txn_id(tid)?),
            ("abort", _) => return Err(ShellError::Usage("abort <tid>")),

            ("holders", [item]) => ShellCommand::Holders(item.to_string()),
            ("holders", _) => return Err(ShellError::Usage("holders <item>")),

            ("txn", [tid]) => ShellCommand::Txn(parse_txn_id(tid)?),
            ("txn", _) => return Err(ShellError::Usage("txn <tid>")),

            ("table", []) => ShellCommand::Table,
            ("stats", []) => ShellCommand::Stats,
            ("help", []) => ShellCommand::Help,
            ("exit" | "quit", []) => ShellCommand::Exit,

            _ => return Err(ShellError::UnknownCommand(line.trim().to_string())),
        };
        Ok(Some(command))
    }
}
