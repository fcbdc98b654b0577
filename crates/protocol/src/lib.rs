//! `ledgerprobe-protocol` — ledger API wire types (v1, frozen).
//!
//! This crate defines the canonical JSON types exchanged with a ledger
//! service at its transaction-ingestion boundary:
//!
//! - `POST {endpoint}/v1/transactions` takes a [`TransactionRequest`] body.
//! - `GET {endpoint}/v1/accounts?id={account_id}` answers an
//!   [`AccountBalance`] body.
//!
//! The wire format is **frozen**: the checker's pass/fail verdicts are only
//! meaningful against a ledger speaking exactly this shape. Changes here are
//! protocol changes, not refactors; update the golden tests at the bottom of
//! this file deliberately or not at all.

use serde::{Deserialize, Serialize};

/// HTTP status a ledger answers for a freshly applied transaction.
///
/// The boundary contract recognizes exactly two valid outcomes for a
/// submission: this status ("created") and any status >= 400 ("rejected").
/// Everything else is out of contract.
pub const STATUS_CREATED: u16 = 201;

/// One posting line of a transaction: a signed adjustment to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub account: String,
    pub delta: i64,
}

/// POST body for `/v1/transactions`.
///
/// `id` is the ledger-side idempotency key: a ledger must apply a given id at
/// most once, no matter how many times (or how concurrently) it is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub id: String,
    pub lines: Vec<Line>,
}

/// GET response body for `/v1/accounts?id=…`.
///
/// Only `balance` is required by the boundary contract; `id` and any extra
/// fields a ledger includes are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub id: String,
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_request_wire_shape() {
        let req = TransactionRequest {
            id: "sequential_1_20260821060000_T100".into(),
            lines: vec![
                Line { account: "alice".into(), delta: 100 },
                Line { account: "bob".into(), delta: -100 },
            ],
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "sequential_1_20260821060000_T100",
                "lines": [
                    { "account": "alice", "delta": 100 },
                    { "account": "bob", "delta": -100 },
                ],
            }),
        );

        // Exactly two top-level keys; the ledger owns everything else.
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn account_balance_requires_only_balance() {
        // Bare minimum body.
        let acc: AccountBalance = serde_json::from_str(r#"{"balance": -250}"#).unwrap();
        assert_eq!(acc.balance, -250);
        assert_eq!(acc.id, "");

        // Full body with extra fields a richer ledger might attach.
        let acc: AccountBalance = serde_json::from_str(
            r#"{"id": "alice", "balance": 750, "data": {"tier": "gold"}}"#,
        )
        .unwrap();
        assert_eq!(acc.id, "alice");
        assert_eq!(acc.balance, 750);
    }

    #[test]
    fn account_balance_rejects_missing_balance() {
        let err = serde_json::from_str::<AccountBalance>(r#"{"id": "alice"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn line_round_trip() {
        let line = Line { account: "fees".into(), delta: -3 };
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, r#"{"account":"fees","delta":-3}"#);
        let back: Line = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}
