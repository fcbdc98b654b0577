use ledgerprobe_protocol::Line;

use crate::error::CheckError;
use crate::model::{Account, Transaction, TransactionSet};

/// Parse `(transaction_id, account_id, delta)` CSV rows into the check model.
///
/// Rows sharing a transaction id merge into one transaction, lines in input
/// order. Rows sharing an account id accumulate that account's delta sum.
/// Both lists keep first-appearance order, so a given file always produces
/// the same model. The header row is skipped; an input with no data rows
/// yields an empty model.
pub fn load_transaction_set(csv_data: &str) -> Result<TransactionSet, CheckError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let mut transactions: Vec<Transaction> = Vec::new();
    let mut accounts: Vec<Account> = Vec::new();

    for (i, record) in reader.records().enumerate() {
        // Header is row 1; data rows are reported from 2.
        let row = i + 2;
        let record = record.map_err(|e| CheckError::MalformedInput {
            line: row,
            message: e.to_string(),
        })?;

        if record.len() != 3 {
            return Err(CheckError::MalformedInput {
                line: row,
                message: format!(
                    "expected 3 fields (transaction, account, delta), found {}",
                    record.len()
                ),
            });
        }

        let transaction_id = record[0].to_string();
        let account_id = record[1].to_string();
        let delta: i64 = record[2].trim().parse().map_err(|_| CheckError::MalformedInput {
            line: row,
            message: format!("delta '{}' is not an integer", &record[2]),
        })?;

        let line = Line { account: account_id.clone(), delta };
        match transactions.iter_mut().find(|t| t.id == transaction_id) {
            Some(txn) => txn.lines.push(line),
            None => transactions.push(Transaction {
                id: transaction_id,
                lines: vec![line],
            }),
        }

        match accounts.iter_mut().find(|a| a.id == account_id) {
            Some(account) => account.delta_sum += delta,
            None => accounts.push(Account {
                id: account_id,
                delta_sum: delta,
                expected_balance: None,
            }),
        }
    }

    Ok(TransactionSet { transactions, accounts })
}
