use std::fmt;

use crate::model::Phase;

/// A check failure. Every variant is fatal: the harness reports it and
/// stops, it never retries and never runs the remaining phases.
#[derive(Debug)]
pub enum CheckError {
    /// Input row that cannot become part of the model.
    MalformedInput { line: usize, message: String },
    /// Transport-level failure talking to the ledger.
    Transport(String),
    /// Status code outside the set the phase accepts.
    UnexpectedStatus {
        transaction_id: String,
        phase: Phase,
        status: u16,
    },
    /// Observed balance diverged from the oracle's expectation.
    BalanceMismatch {
        account_id: String,
        phase: Phase,
        expected: i64,
        observed: i64,
    },
    /// A duplicate pair resolved to something other than exactly one accept.
    RaceViolation {
        transaction_id: String,
        kind: RaceViolationKind,
        first: u16,
        second: u16,
    },
}

/// How a duplicate pair went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceViolationKind {
    /// Both submissions were accepted: the ledger applied a duplicate.
    BothAccepted,
    /// Both submissions were rejected: the transaction never landed.
    BothRejected,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { line, message } => {
                write!(f, "malformed input at row {line}: {message}")
            }
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
            Self::UnexpectedStatus { transaction_id, phase, status } => {
                write!(
                    f,
                    "{phase} phase: transaction '{transaction_id}' returned unexpected status {status}"
                )
            }
            Self::BalanceMismatch { account_id, phase, expected, observed } => {
                write!(
                    f,
                    "{phase} phase: account '{account_id}' expected balance {expected}, observed {observed}"
                )
            }
            Self::RaceViolation { transaction_id, kind, first, second } => {
                let what = match kind {
                    RaceViolationKind::BothAccepted => "accepted twice",
                    RaceViolationKind::BothRejected => "rejected twice",
                };
                write!(
                    f,
                    "repeated phase: duplicate transaction '{transaction_id}' {what} ({first}, {second})"
                )
            }
        }
    }
}

impl std::error::Error for CheckError {}
