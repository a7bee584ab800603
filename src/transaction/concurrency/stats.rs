use serde::Serialize;

/// Lock manager counters
///
/// Observability only; nothing in the grant logic reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockStatistics {
    /// Lock requests granted through standard acquisition
    pub granted: u64,
    /// Lock requests denied on standard acquisition
    pub waited: u64,
    /// Transactions aborted
    pub aborted: u64,
    /// Transactions committed
    pub committed: u64,
    /// Successful shared-to-exclusive upgrades
    pub upgraded: u64,
}

impl LockStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_grant(&mut self) {
        self.granted += 1;
    }

    pub fn record_wait(&mut self) {
        self.waited += 1;
    }

    pub fn record_abort(&mut self) {
        self.aborted += 1;
    }

    pub fn record_commit(&mut self) {
        self.committed += 1;
    }

    pub fn record_upgrade(&mut self) {
        self.upgraded += 1;
    }
}
