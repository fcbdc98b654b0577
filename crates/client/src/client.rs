//! Blocking HTTP client for the two ledger endpoints.
//!
//! Mirrors the boundary contract exactly: balance reads decode whatever body
//! comes back (the status is not part of the read contract), and transaction
//! posts hand the raw status code back to the caller. Classifying statuses
//! is the engine's job, not the transport's.

use ledgerprobe_protocol::{AccountBalance, TransactionRequest};

/// Ledger API client (blocking).
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

/// Error type for ledger API calls.
///
/// Both variants are fatal to a check run; nothing here is retried.
#[derive(Debug)]
pub enum LedgerError {
    /// Network/transport error (connect, send, read).
    Network(String),
    /// Response body did not decode as the expected wire type.
    Decode(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Network(msg) => write!(f, "network error: {}", msg),
            LedgerError::Decode(msg) => write!(f, "invalid ledger response: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

impl LedgerClient {
    /// Create a client for the ledger at `endpoint` (base URL, with or
    /// without a trailing slash).
    pub fn new(endpoint: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("lprobe/{}", env!("CARGO_PKG_VERSION")))
            // No request deadline: a hung ledger stalls the run instead of
            // surfacing as a transport error.
            .timeout(None)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Query the current balance of one account.
    ///
    /// `GET {endpoint}/v1/accounts?id={account_id}`. The body is decoded as
    /// [`AccountBalance`] regardless of status; a body that does not decode
    /// is a [`LedgerError::Decode`].
    pub fn account_balance(&self, account_id: &str) -> Result<i64, LedgerError> {
        let url = format!("{}/v1/accounts", self.endpoint);
        let resp = self
            .http
            .get(&url)
            .query(&[("id", account_id)])
            .send()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        let account: AccountBalance = resp
            .json()
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        Ok(account.balance)
    }

    /// Submit one transaction and return the raw HTTP status code.
    ///
    /// `POST {endpoint}/v1/transactions`. Every status, in contract or not,
    /// is data for the caller; only transport failures are errors here.
    pub fn post_transaction(&self, txn: &TransactionRequest) -> Result<u16, LedgerError> {
        let url = format!("{}/v1/transactions", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .json(txn)
            .send()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        Ok(resp.status().as_u16())
    }
}
