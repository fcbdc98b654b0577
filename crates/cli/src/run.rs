//! The three check phases, run in escalating order against one ledger.
//!
//! Every phase follows the same frame: read live balances and pin the
//! expectation, submit tagged clones, then re-read and compare. Expectations
//! are re-baselined from live balances at the start of each phase, so a
//! phase composes with whatever state the previous one left behind.
//!
//! All failures are fatal. The runner never retries a submission or a
//! balance read: an oracle that retries past a fault can no longer tell a
//! fault from a pass.

use ledgerprobe_checker::{
    check_balance, classify_race, clone_with_tag, expected_balance, phase_tag, require_created,
    CheckError, Phase, TransactionSet,
};
use ledgerprobe_client::LedgerClient;

/// Run all three phases in order: sequential, parallel, repeated.
///
/// The first failure aborts the run; later phases do not execute.
pub fn run_checks(
    client: &LedgerClient,
    set: &mut TransactionSet,
    load: u32,
    run_stamp: &str,
    quiet: bool,
) -> Result<(), CheckError> {
    run_sequential(client, set, load, run_stamp, quiet)?;
    run_parallel(client, set, load, run_stamp, quiet)?;
    run_repeated(client, set, load, run_stamp, quiet)?;
    Ok(())
}

/// Post every tagged clone one at a time, in input order, each required to
/// come back 201 before the next goes out.
pub fn run_sequential(
    client: &LedgerClient,
    set: &mut TransactionSet,
    load: u32,
    run_stamp: &str,
    quiet: bool,
) -> Result<(), CheckError> {
    banner(Phase::Sequential, set, load, quiet);
    prepare_balances(client, set, load, quiet)?;

    for repetition in 1..=load {
        let tag = phase_tag(Phase::Sequential, repetition, run_stamp);
        for txn in &set.transactions {
            let request = clone_with_tag(txn, &tag);
            if !quiet {
                eprintln!("posting transaction: {}", request.id);
            }
            let status = client
                .post_transaction(&request)
                .map_err(|e| CheckError::Transport(e.to_string()))?;
            if !quiet {
                eprintln!("transaction {}: status {}", request.id, status);
            }
            require_created(&request.id, Phase::Sequential, status)?;
        }
    }

    verify_balances(client, set, Phase::Sequential, quiet)
}

/// Post every (transaction, repetition) clone concurrently, each from its
/// own thread, each required to come back 201.
pub fn run_parallel(
    client: &LedgerClient,
    set: &mut TransactionSet,
    load: u32,
    run_stamp: &str,
    quiet: bool,
) -> Result<(), CheckError> {
    banner(Phase::Parallel, set, load, quiet);
    prepare_balances(client, set, load, quiet)?;

    // The scope exit is the phase barrier: every submission has an outcome
    // before anything verifies.
    let results: Vec<Result<(), CheckError>> = std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for repetition in 1..=load {
            let tag = phase_tag(Phase::Parallel, repetition, run_stamp);
            for txn in &set.transactions {
                let request = clone_with_tag(txn, &tag);
                handles.push(scope.spawn(move || {
                    if !quiet {
                        eprintln!("posting transaction: {}", request.id);
                    }
                    let status = client
                        .post_transaction(&request)
                        .map_err(|e| CheckError::Transport(e.to_string()))?;
                    if !quiet {
                        eprintln!("transaction {}: status {}", request.id, status);
                    }
                    require_created(&request.id, Phase::Parallel, status)
                }));
            }
        }
        handles
            .into_iter()
            .map(|h| h.join().expect("posting thread panicked"))
            .collect()
    });
    for result in results {
        result?;
    }

    verify_balances(client, set, Phase::Parallel, quiet)
}

/// Post each tagged clone twice, concurrently, from a nested pair of
/// threads; the ledger must accept exactly one of each pair. Pairs race
/// one another too: the whole phase is in flight at once.
pub fn run_repeated(
    client: &LedgerClient,
    set: &mut TransactionSet,
    load: u32,
    run_stamp: &str,
    quiet: bool,
) -> Result<(), CheckError> {
    banner(Phase::Repeated, set, load, quiet);
    prepare_balances(client, set, load, quiet)?;

    let results: Vec<Result<(), CheckError>> = std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for repetition in 1..=load {
            let tag = phase_tag(Phase::Repeated, repetition, run_stamp);
            for txn in &set.transactions {
                let request = clone_with_tag(txn, &tag);
                handles.push(scope.spawn(move || {
                    if !quiet {
                        eprintln!("posting duplicate pair: {}", request.id);
                    }
                    // The inner scope is the pair barrier: both duplicates
                    // are in flight together and both have landed before
                    // the pair is judged.
                    let (first, second) = std::thread::scope(|pair| {
                        let a = pair.spawn(|| client.post_transaction(&request));
                        let b = pair.spawn(|| client.post_transaction(&request));
                        (
                            a.join().expect("duplicate posting thread panicked"),
                            b.join().expect("duplicate posting thread panicked"),
                        )
                    });
                    let first = first.map_err(|e| CheckError::Transport(e.to_string()))?;
                    let second = second.map_err(|e| CheckError::Transport(e.to_string()))?;
                    if !quiet {
                        eprintln!("duplicate pair {}: statuses {} and {}", request.id, first, second);
                    }
                    classify_race(&request.id, first, second)
                }));
            }
        }
        handles
            .into_iter()
            .map(|h| h.join().expect("pair thread panicked"))
            .collect()
    });
    for result in results {
        result?;
    }

    verify_balances(client, set, Phase::Repeated, quiet)
}

/// Read each account's live balance and pin this phase's expectation: the
/// account moves by `delta_sum * load` from wherever it is now.
fn prepare_balances(
    client: &LedgerClient,
    set: &mut TransactionSet,
    load: u32,
    quiet: bool,
) -> Result<(), CheckError> {
    for account in &mut set.accounts {
        let current = client
            .account_balance(&account.id)
            .map_err(|e| CheckError::Transport(e.to_string()))?;
        let expected = expected_balance(current, account.delta_sum, load);
        account.expected_balance = Some(expected);
        if !quiet {
            eprintln!("account {}: balance {}, expecting {}", account.id, current, expected);
        }
    }
    Ok(())
}

/// Re-read each account and compare against the expectation pinned by
/// [`prepare_balances`].
fn verify_balances(
    client: &LedgerClient,
    set: &TransactionSet,
    phase: Phase,
    quiet: bool,
) -> Result<(), CheckError> {
    for account in &set.accounts {
        let observed = client
            .account_balance(&account.id)
            .map_err(|e| CheckError::Transport(e.to_string()))?;
        // Every phase prepares before it verifies; a missing expectation is
        // a bug in the runner itself, not in the ledger.
        let expected = account
            .expected_balance
            .expect("verify_balances called before prepare_balances");
        check_balance(&account.id, phase, expected, observed)?;
        if !quiet {
            eprintln!("account {}: verified at {}", account.id, observed);
        }
    }
    if !quiet {
        eprintln!("{phase} phase: balances verified");
    }
    Ok(())
}

fn banner(phase: Phase, set: &TransactionSet, load: u32, quiet: bool) {
    if !quiet {
        eprintln!(
            "{} phase: {} transactions x {} repetitions",
            phase,
            set.transactions.len(),
            load
        );
    }
}
