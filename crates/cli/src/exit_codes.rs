//! CLI Exit Code Registry
//!
//! Single source of truth for `lprobe` exit codes. Exit codes are part of
//! the shell contract; scripts and CI gates key off them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | All phases passed                              |
//! | 1    | General error (built-in ledger boot failure)   |
//! | 2    | CLI usage error (bad args, emitted by clap)    |
//! | 10   | Malformed input file                           |
//! | 11   | Transport failure talking to the ledger        |
//! | 12   | Unexpected HTTP status from a submission       |
//! | 13   | Observed balance diverged from expectation     |
//! | 14   | Duplicate pair accepted twice or rejected twice|
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant and document what triggers it
//! 2. Update the table above
//! 3. Wire it into `check_exit_code` or the binary's error handling

use ledgerprobe_checker::CheckError;

/// Success - every phase posted and verified cleanly.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - failure outside the check taxonomy (e.g. the built-in
/// ledger cannot bind its port).
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, unreadable, or with rows that don't parse.
pub const EXIT_CHECK_INPUT: u8 = 10;

/// Network-level failure (connect, send, read) or undecodable response.
pub const EXIT_CHECK_TRANSPORT: u8 = 11;

/// A submission returned a status outside the phase's accepted set.
pub const EXIT_CHECK_STATUS: u8 = 12;

/// An account's observed balance diverged from the computed expectation.
pub const EXIT_CHECK_BALANCE: u8 = 13;

/// A duplicate pair was accepted twice or rejected twice.
pub const EXIT_CHECK_RACE: u8 = 14;

/// Map a check failure to its exit code.
pub fn check_exit_code(err: &CheckError) -> u8 {
    match err {
        CheckError::MalformedInput { .. } => EXIT_CHECK_INPUT,
        CheckError::Transport(_) => EXIT_CHECK_TRANSPORT,
        CheckError::UnexpectedStatus { .. } => EXIT_CHECK_STATUS,
        CheckError::BalanceMismatch { .. } => EXIT_CHECK_BALANCE,
        CheckError::RaceViolation { .. } => EXIT_CHECK_RACE,
    }
}
