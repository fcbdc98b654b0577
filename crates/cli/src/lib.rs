//! Library half of `lprobe`: the phase runner, the built-in ledger, and the
//! exit-code registry. The binary in `main.rs` is a thin flag-parsing shell
//! around these; integration tests drive them directly.

pub mod exit_codes;
pub mod localledger;
pub mod run;
