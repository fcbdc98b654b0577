use ledgerprobe_protocol::TransactionRequest;

use crate::model::{Phase, Transaction};

/// Tag for one (phase, repetition) slot: `{phase}_{repetition}_{run_stamp}`.
///
/// The run stamp is shared by every tag of one run, keeping ids from this
/// run distinct from earlier runs against the same ledger; phase and
/// repetition keep ids distinct within the run.
pub fn phase_tag(phase: Phase, repetition: u32, run_stamp: &str) -> String {
    format!("{phase}_{repetition}_{run_stamp}")
}

/// Clone a canonical transaction under a tag: id becomes
/// `{tag}_{original_id}`, lines are copied verbatim.
///
/// Deterministic for a given (transaction, tag), which is how the repeated
/// phase manufactures byte-identical duplicates on purpose.
pub fn clone_with_tag(txn: &Transaction, tag: &str) -> TransactionRequest {
    TransactionRequest {
        id: format!("{tag}_{}", txn.id),
        lines: txn.lines.clone(),
    }
}
