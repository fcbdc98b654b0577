// Integration tests for the lprobe check phases.
// Run with: cargo test -p ledgerprobe-cli --test check_run
//
// Library-level tests drive the runner against in-process ledgers, honest
// and faulty; binary-level tests pin the exit-code contract.

use std::path::PathBuf;
use std::process::Command;

use ledgerprobe_checker::{load_transaction_set, CheckError, RaceViolationKind, TransactionSet};
use ledgerprobe_client::LedgerClient;
use ledgerprobe_cli::localledger::{Fault, LocalLedger};
use ledgerprobe_cli::run::{run_checks, run_repeated, run_sequential};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_set() -> TransactionSet {
    let csv = std::fs::read_to_string(fixtures_dir().join("transactions.csv")).unwrap();
    load_transaction_set(&csv).unwrap()
}

fn lprobe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lprobe"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    // Clear env so a configured endpoint never leaks into tests
    cmd.env_remove("LPROBE_ENDPOINT");
    cmd
}

// The fixture's per-account delta sums: acc_1 +150, acc_2 -100, acc_3 -50.

#[test]
fn sequential_phase_posts_load_times() {
    let ledger = LocalLedger::start().unwrap();
    let client = LedgerClient::new(ledger.endpoint());
    let mut set = fixture_set();

    run_sequential(&client, &mut set, 4, "19840101000000", true).unwrap();

    assert_eq!(client.account_balance("acc_1").unwrap(), 600);
    assert_eq!(client.account_balance("acc_2").unwrap(), -400);
    assert_eq!(client.account_balance("acc_3").unwrap(), -200);
}

#[test]
fn full_run_passes_and_conserves_money() {
    let ledger = LocalLedger::start().unwrap();
    let client = LedgerClient::new(ledger.endpoint());
    let mut set = fixture_set();
    let load = 5u32;

    run_checks(&client, &mut set, load, "19840101000000", true).unwrap();

    // Three phases each apply every transaction `load` times.
    let applications = i64::from(load) * 3;
    assert_eq!(client.account_balance("acc_1").unwrap(), 150 * applications);
    assert_eq!(client.account_balance("acc_2").unwrap(), -100 * applications);
    assert_eq!(client.account_balance("acc_3").unwrap(), -50 * applications);

    // Double-entry conservation: every line has its counterweight.
    let total: i64 = set
        .accounts
        .iter()
        .map(|a| client.account_balance(&a.id).unwrap())
        .sum();
    assert_eq!(total, 0);
}

#[test]
fn runs_compose_on_a_dirty_ledger() {
    let ledger = LocalLedger::start().unwrap();
    let client = LedgerClient::new(ledger.endpoint());

    let mut set = fixture_set();
    run_checks(&client, &mut set, 2, "19840101000000", true).unwrap();

    // Second run starts from non-zero balances and must still verify; the
    // fresh stamp keeps its ids distinct from the first run's.
    let mut set = fixture_set();
    run_checks(&client, &mut set, 3, "19840101000001", true).unwrap();

    let applications = i64::from(2 * 3 + 3 * 3);
    assert_eq!(client.account_balance("acc_1").unwrap(), 150 * applications);
}

#[test]
fn full_run_passes_with_awkward_account_ids() {
    let ledger = LocalLedger::start().unwrap();
    let client = LedgerClient::new(ledger.endpoint());

    // Ids the balance query must percent-encode; posted bodies carry them raw.
    let csv = "\
transaction,account,delta
T1,acc one,100
T1,a&b,-100
";
    let mut set = load_transaction_set(csv).unwrap();

    run_checks(&client, &mut set, 2, "19840101000000", true).unwrap();

    let applications = i64::from(2 * 3);
    assert_eq!(client.account_balance("acc one").unwrap(), 100 * applications);
    assert_eq!(client.account_balance("a&b").unwrap(), -100 * applications);
}

#[test]
fn rejecting_both_duplicates_is_a_race_violation() {
    let ledger = LocalLedger::start_with_fault(Fault::RejectAll).unwrap();
    let client = LedgerClient::new(ledger.endpoint());
    let mut set = fixture_set();

    let err = run_repeated(&client, &mut set, 2, "19840101000000", true).unwrap_err();

    match err {
        CheckError::RaceViolation { kind, first, second, .. } => {
            assert_eq!(kind, RaceViolationKind::BothRejected);
            assert_eq!((first, second), (409, 409));
        }
        other => panic!("expected RaceViolation, got {other:?}"),
    }
}

// ── Binary exit-code contract ───────────────────────────────────────

#[test]
fn binary_runs_self_contained_against_builtin_ledger() {
    let output = lprobe()
        .args(["--filename", "tests/fixtures/transactions.csv", "--load", "3"])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("all checks passed"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sequential phase"), "stderr: {stderr}");
    assert!(stderr.contains("repeated phase"), "stderr: {stderr}");
}

#[test]
fn missing_input_file_exits_10() {
    let output = lprobe()
        .args(["--filename", "does-not-exist.csv", "--quiet"])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(10),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read"), "stderr: {stderr}");
}

#[test]
fn malformed_input_fails_before_touching_the_ledger() {
    let ledger = LocalLedger::start().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "transaction,account,delta\nT1,A1,abc\n").unwrap();

    let output = lprobe()
        .args([
            "--endpoint",
            &ledger.endpoint(),
            "--filename",
            path.to_str().unwrap(),
            "--quiet",
        ])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(10),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not an integer"), "stderr: {stderr}");

    // The ledger never saw a transaction.
    let client = LedgerClient::new(ledger.endpoint());
    assert_eq!(client.account_balance("A1").unwrap(), 0);
}

#[test]
fn zero_load_is_a_usage_error() {
    let output = lprobe()
        .args(["--load", "0", "--quiet"])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(2),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn unreachable_endpoint_exits_11() {
    let output = lprobe()
        .args([
            "--endpoint",
            "http://127.0.0.1:9",
            "--filename",
            "tests/fixtures/transactions.csv",
            "--quiet",
        ])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(11),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("transport failure"), "stderr: {stderr}");
    assert!(stderr.contains("hint:"), "stderr: {stderr}");
}

#[test]
fn wrong_success_status_exits_12() {
    let ledger = LocalLedger::start_with_fault(Fault::WrongSuccessStatus).unwrap();
    let output = lprobe()
        .args([
            "--endpoint",
            &ledger.endpoint(),
            "--filename",
            "tests/fixtures/transactions.csv",
            "--load",
            "2",
            "--quiet",
        ])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(12),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected status 200"), "stderr: {stderr}");
}

#[test]
fn acking_without_applying_exits_13() {
    let ledger = LocalLedger::start_with_fault(Fault::AckWithoutApply).unwrap();
    let output = lprobe()
        .args([
            "--endpoint",
            &ledger.endpoint(),
            "--filename",
            "tests/fixtures/transactions.csv",
            "--load",
            "2",
            "--quiet",
        ])
        .output()
        .expect("failed to run lprobe");

    assert_eq!(
        output.status.code(),
        Some(13),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected balance"), "stderr: {stderr}");
}

#[test]
fn accepting_duplicates_exits_14() {
    let ledger = LocalLedger::start_with_fault(Fault::AcceptDuplicates).unwrap();
    let output = lprobe()
        .args([
            "--endpoint",
            &ledger.endpoint(),
            "--filename",
            "tests/fixtures/transactions.csv",
            "--load",
            "2",
            "--quiet",
        ])
        .output()
        .expect("failed to run lprobe");

    // Sequential and parallel phases pass (every id is fresh); the fault
    // only bites when the repeated phase posts real duplicates.
    assert_eq!(
        output.status.code(),
        Some(14),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("accepted twice"), "stderr: {stderr}");
}
