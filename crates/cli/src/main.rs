// lprobe - correctness checks for a ledger service over its HTTP API.
//
// Posts a CSV-defined transaction set sequentially, concurrently, and in
// concurrent duplicate pairs, verifying account balances after each phase.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ledgerprobe_checker::{load_transaction_set, CheckError};
use ledgerprobe_client::LedgerClient;
use ledgerprobe_cli::exit_codes::{check_exit_code, EXIT_CHECK_INPUT, EXIT_ERROR, EXIT_SUCCESS};
use ledgerprobe_cli::localledger::LocalLedger;
use ledgerprobe_cli::run::run_checks;

#[derive(Parser)]
#[command(name = "lprobe")]
#[command(about = "Posts ledger transactions sequentially, concurrently, and in duplicate pairs, then verifies balances")]
#[command(version)]
struct Cli {
    /// Ledger base URL; omit to check a built-in in-memory ledger
    #[arg(long, env = "LPROBE_ENDPOINT")]
    endpoint: Option<String>,

    /// CSV of (transaction, account, delta) rows
    #[arg(long, default_value = "transactions.csv")]
    filename: PathBuf,

    /// Times each transaction is posted per phase
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    load: u32,

    /// Suppress progress output (errors still print)
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cmd_check(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    /// Create error from a check failure with its registered exit code.
    fn check(err: CheckError) -> Self {
        let hint = match &err {
            CheckError::Transport(_) => {
                Some("is the ledger reachable at the given --endpoint?".to_string())
            }
            CheckError::MalformedInput { .. } => {
                Some("rows must be transaction_id,account_id,delta".to_string())
            }
            _ => None,
        };
        Self { code: check_exit_code(&err), message: err.to_string(), hint }
    }
}

fn cmd_check(cli: Cli) -> Result<(), CliError> {
    let csv_data = std::fs::read_to_string(&cli.filename).map_err(|e| CliError {
        code: EXIT_CHECK_INPUT,
        message: format!("cannot read {}: {}", cli.filename.display(), e),
        hint: Some("pass --filename or create transactions.csv".to_string()),
    })?;

    // Load before any network traffic: a malformed file must fail the run
    // without touching the ledger.
    let mut set = load_transaction_set(&csv_data).map_err(CliError::check)?;

    let (endpoint, _local) = match cli.endpoint {
        Some(endpoint) => (endpoint, None),
        None => {
            // A failed local bind is not a ledger transport failure; it gets
            // the general code, not 11.
            let ledger = LocalLedger::start().map_err(|e| CliError {
                code: EXIT_ERROR,
                message: format!("cannot start built-in ledger: {}", e),
                hint: None,
            })?;
            if !cli.quiet {
                eprintln!("no --endpoint given; checking built-in ledger at {}", ledger.endpoint());
            }
            // Held until the run finishes so the listener stays up.
            (ledger.endpoint(), Some(ledger))
        }
    };

    let client = LedgerClient::new(endpoint);
    let run_stamp = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();

    run_checks(&client, &mut set, cli.load, &run_stamp, cli.quiet).map_err(CliError::check)?;

    println!("all checks passed: sequential, parallel, repeated");
    Ok(())
}
