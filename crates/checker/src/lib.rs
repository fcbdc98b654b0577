//! `ledgerprobe-checker` — pure check engine behind `lprobe`.
//!
//! Pure engine crate: parses the transaction model, computes expected
//! balances, mints per-phase transaction clones, and judges duplicate
//! submission outcomes. No HTTP or IO dependencies; the runner owns all
//! network traffic and feeds observations in.

pub mod error;
pub mod load;
pub mod model;
pub mod oracle;
pub mod race;
pub mod tag;

pub use error::{CheckError, RaceViolationKind};
pub use load::load_transaction_set;
pub use model::{Account, Phase, Transaction, TransactionSet};
pub use oracle::{check_balance, expected_balance};
pub use race::{classify_race, require_created};
pub use tag::{clone_with_tag, phase_tag};
