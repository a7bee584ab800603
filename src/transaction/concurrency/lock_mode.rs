// Lock modes and their compatibility relation
//
//          │ S  │ X  │
// ─────────┼────┼────┤
//     S    │ ✓  │ ✗  │
//     X    │ ✗  │ ✗  │

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lock mode for a data item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LockMode {
    /// Read lock
    Shared,
    /// Write lock
    Exclusive,
}

/// Row: held mode, column: requested mode.
const COMPATIBILITY: [[bool; LockMode::COUNT]; LockMode::COUNT] = [
    // S      X
    [true, false], // S
    [false, false], // X
];

/// Row: held mode, column: requested mode. A holder of the row mode
/// needs nothing further to satisfy the column mode.
const COVERS: [[bool; LockMode::COUNT]; LockMode::COUNT] = [
    // S      X
    [true, false], // S
    [true, true],  // X
];

impl LockMode {
    /// Number of lock modes
    pub const COUNT: usize = 2;

    /// Every mode, in table order
    pub const ALL: [LockMode; LockMode::COUNT] = [LockMode::Shared, LockMode::Exclusive];

    fn index(self) -> usize {
        match self {
            LockMode::Shared => 0,
            LockMode::Exclusive => 1,
        }
    }

    /// Whether a lock in `self` held by one transaction can coexist with a
    /// lock in `requested` held by a different transaction.
    pub fn is_compatible_with(self, requested: LockMode) -> bool {
        COMPATIBILITY[self.index()][requested.index()]
    }

    /// Whether holding `self` already satisfies a request for `requested`.
    pub fn covers(self, requested: LockMode) -> bool {
        COVERS[self.index()][requested.index()]
    }

    /// Short code used in diagnostics ("S" / "X")
    pub fn code(self) -> &'static str {
        match self {
            LockMode::Shared => "S",
            LockMode::Exclusive => "X",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a lock mode string can't be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown lock mode: {0}")]
pub struct ParseLockModeError(pub String);

impl FromStr for LockMode {
    type Err = ParseLockModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "shared" | "read" => Ok(LockMode::Shared),
            "x" | "exclusive" | "write" => Ok(LockMode::Exclusive),
            _ => Err(ParseLockModeError(s.to_string())),
        }
    }
}
