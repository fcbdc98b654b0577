use ledgerprobe_protocol::STATUS_CREATED;

use crate::error::{CheckError, RaceViolationKind};
use crate::model::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Rejected,
}

/// Map a status code onto the duplicate-pair contract: 201 created,
/// 400 and above rejected, anything else out of contract.
fn screen(transaction_id: &str, status: u16) -> Result<Outcome, CheckError> {
    if status == STATUS_CREATED {
        Ok(Outcome::Created)
    } else if status >= 400 {
        Ok(Outcome::Rejected)
    } else {
        Err(CheckError::UnexpectedStatus {
            transaction_id: transaction_id.to_string(),
            phase: Phase::Repeated,
            status,
        })
    }
}

/// Require the created status, the contract for sequential and parallel
/// submissions where no competing duplicate is in flight.
pub fn require_created(transaction_id: &str, phase: Phase, status: u16) -> Result<(), CheckError> {
    if status == STATUS_CREATED {
        return Ok(());
    }
    Err(CheckError::UnexpectedStatus {
        transaction_id: transaction_id.to_string(),
        phase,
        status,
    })
}

/// Judge a duplicate pair by its two status codes.
///
/// Exactly one created and one rejected passes, in either order. Both
/// created means the ledger applied a duplicate; both rejected means the
/// transaction never landed. A status outside {201, >=400} fails on its
/// own, before the pair is judged.
pub fn classify_race(transaction_id: &str, first: u16, second: u16) -> Result<(), CheckError> {
    let a = screen(transaction_id, first)?;
    let b = screen(transaction_id, second)?;

    match (a, b) {
        (Outcome::Created, Outcome::Rejected) | (Outcome::Rejected, Outcome::Created) => Ok(()),
        (Outcome::Created, Outcome::Created) => Err(CheckError::RaceViolation {
            transaction_id: transaction_id.to_string(),
            kind: RaceViolationKind::BothAccepted,
            first,
            second,
        }),
        (Outcome::Rejected, Outcome::Rejected) => Err(CheckError::RaceViolation {
            transaction_id: transaction_id.to_string(),
            kind: RaceViolationKind::BothRejected,
            first,
            second,
        }),
    }
}
