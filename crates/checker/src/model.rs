use std::fmt;

use ledgerprobe_protocol::Line;

/// The three check phases, in run order. `Display` renders the label used
/// in transaction tags and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// One submission in flight at a time.
    Sequential,
    /// Every (transaction, repetition) submitted concurrently.
    Parallel,
    /// Identical duplicates submitted concurrently in pairs.
    Repeated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Sequential => "sequential",
            Phase::Parallel => "parallel",
            Phase::Repeated => "repeated",
        };
        f.write_str(label)
    }
}

/// A canonical transaction from the input file. Never submitted as-is:
/// phases submit tagged clones and leave the canonical form untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub lines: Vec<Line>,
}

/// One account touched by the transaction set.
///
/// `delta_sum` is fixed once the set is loaded. `expected_balance` is the
/// only slot that changes afterwards, and only in the single-threaded
/// prepare step of each phase; worker threads never write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub delta_sum: i64,
    pub expected_balance: Option<i64>,
}

/// The loaded model: transactions and accounts in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSet {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Sequential.to_string(), "sequential");
        assert_eq!(Phase::Parallel.to_string(), "parallel");
        assert_eq!(Phase::Repeated.to_string(), "repeated");
    }
}
