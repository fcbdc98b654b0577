//! `ledgerprobe-client` — blocking HTTP client for the ledger boundary.
//!
//! This crate is the single source of truth for how the checker talks to a
//! ledger: one balance query, one transaction submission, nothing else.
//!
//! No retries. No request deadline. No status-code policy; the checker
//! owns the verdicts, this crate reports what the wire said.

mod client;

pub use client::{LedgerClient, LedgerError};
