use crate::error::CheckError;
use crate::model::Phase;

/// Expected balance once a phase has posted every transaction `load` times:
/// the balance observed before the phase plus `delta_sum * load`.
pub fn expected_balance(current: i64, delta_sum: i64, load: u32) -> i64 {
    current + delta_sum * i64::from(load)
}

/// Compare an observed balance against the oracle's expectation.
pub fn check_balance(
    account_id: &str,
    phase: Phase,
    expected: i64,
    observed: i64,
) -> Result<(), CheckError> {
    if observed == expected {
        return Ok(());
    }
    Err(CheckError::BalanceMismatch {
        account_id: account_id.to_string(),
        phase,
        expected,
        observed,
    })
}
