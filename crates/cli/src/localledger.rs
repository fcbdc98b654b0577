//! In-memory stand-in ledger for self-contained runs and tests.
//!
//! Serves the two-endpoint ledger contract over real HTTP on an ephemeral
//! loopback port: balances start at zero, a transaction id is applied
//! exactly once, duplicates come back 409. One lock covers the duplicate
//! check and the line application, so the exactly-once contract holds under
//! concurrent posts, which is exactly what the repeated phase exercises.
//!
//! Fault knobs let tests hand the harness a misbehaving ledger on purpose.
//!
//! The HTTP parsing is the minimum the contract needs: request line, headers
//! up to the blank line, `Content-Length` body. Query values arrive
//! form-urlencoded and are decoded (`%XX` and `+`) before the lookup, so the
//! id in a balance query lands on the same account a posted body named raw.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ledgerprobe_protocol::{AccountBalance, TransactionRequest, STATUS_CREATED};

/// Deliberate misbehavior, for proving the checks catch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Honest ledger.
    None,
    /// Apply and accept a transaction id every time it is posted.
    AcceptDuplicates,
    /// Reject every transaction with 409.
    RejectAll,
    /// Answer 201 without applying the lines.
    AckWithoutApply,
    /// Apply correctly but answer 200 instead of 201.
    WrongSuccessStatus,
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<String, i64>,
    applied: HashSet<String>,
}

/// A running local ledger. Dropping it stops the listener.
pub struct LocalLedger {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LocalLedger {
    /// Bind an honest ledger on an ephemeral loopback port.
    pub fn start() -> std::io::Result<Self> {
        Self::start_with_fault(Fault::None)
    }

    /// Bind a ledger that misbehaves per `fault`.
    pub fn start_with_fault(fault: Fault) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        // Non-blocking so the accept loop can poll the shutdown flag.
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(LedgerState::default()));

        let handle = {
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || run_listener(listener, shutdown, state, fault))
        };

        Ok(Self { addr, shutdown, handle: Some(handle) })
    }

    /// Base URL clients should target.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Signal the listener to stop and wait for it.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LocalLedger {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_listener(
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    state: Arc<Mutex<LedgerState>>,
    fault: Fault,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _addr)) => {
                let state = Arc::clone(&state);
                // One thread per connection; a broken connection only
                // kills its own handler.
                thread::spawn(move || {
                    let _ = handle_connection(stream, &state, fault);
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => break,
        }
    }
}

/// Read one request, answer it, close. `connection: close` keeps the
/// client from reusing the stream.
fn handle_connection(
    stream: TcpStream,
    state: &Mutex<LedgerState>,
    fault: Fault,
) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }

    let (status, response_body) = route(&method, &target, &body, state, fault);
    write_response(reader.into_inner(), status, &response_body)
}

fn route(
    method: &str,
    target: &str,
    body: &[u8],
    state: &Mutex<LedgerState>,
    fault: Fault,
) -> (u16, String) {
    match method {
        "GET" if target.starts_with("/v1/accounts") => {
            let id = query_param(target, "id").unwrap_or_default();
            let balance = {
                let state = state.lock().expect("ledger state poisoned");
                state.balances.get(&id).copied().unwrap_or(0)
            };
            let account = AccountBalance { id, balance };
            (
                200,
                serde_json::to_string(&account).expect("balance always serializes"),
            )
        }
        "POST" if target == "/v1/transactions" => apply_transaction(body, state, fault),
        _ => (404, r#"{"error":"not found"}"#.to_string()),
    }
}

fn apply_transaction(body: &[u8], state: &Mutex<LedgerState>, fault: Fault) -> (u16, String) {
    let txn: TransactionRequest = match serde_json::from_slice(body) {
        Ok(txn) => txn,
        Err(e) => {
            return (
                400,
                serde_json::json!({ "error": e.to_string() }).to_string(),
            )
        }
    };

    if fault == Fault::RejectAll {
        return (
            409,
            serde_json::json!({ "error": "transaction rejected" }).to_string(),
        );
    }

    // Duplicate check and application under one lock: exactly-once is the
    // contract the repeated phase exists to exercise.
    let mut state = state.lock().expect("ledger state poisoned");
    if state.applied.contains(&txn.id) && fault != Fault::AcceptDuplicates {
        return (
            409,
            serde_json::json!({ "error": "transaction id already present" }).to_string(),
        );
    }
    state.applied.insert(txn.id.clone());
    if fault != Fault::AckWithoutApply {
        for line in &txn.lines {
            *state.balances.entry(line.account.clone()).or_insert(0) += line.delta;
        }
    }

    let status = if fault == Fault::WrongSuccessStatus { 200 } else { STATUS_CREATED };
    (status, serde_json::json!({ "id": txn.id }).to_string())
}

fn query_param(target: &str, name: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name {
            return Some(decode_component(value));
        }
    }
    None
}

/// Undo form-urlencoding: `+` means space, `%XX` a byte. Malformed escapes
/// pass through untouched.
fn decode_component(raw: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (
                bytes.get(i + 1).copied().and_then(hex),
                bytes.get(i + 2).copied().and_then(hex),
            ) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Error",
    };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )?;
    stream.flush()
}
