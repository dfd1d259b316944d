//! Soroban RPC client
//!
//! Every method goes through [`RpcClient::request`], which builds the JSON-RPC
//! envelope, posts it and turns a non-null `error` into [`Error::RpcResponse`]
//! whatever the HTTP status was. Submission polls the transaction status on a
//! fixed ticker until it reaches a terminal status or the deadline passes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::{interval_at, timeout_at, Instant, MissedTickBehavior};

use crate::common::{Config, Error, Result, RpcSchema};

use super::ledger::{self, Keypair, TransactionEnvelope};
use super::transport::{HttpTransport, Transport};
use super::types::{
    AccountState, JsonRpcRequest, JsonRpcResponse, LatestLedger, LedgerEntriesResult,
    LedgerEntryResult, SendTransactionResult, TransactionOutcome, TxStatus,
};

/// How often and for how long a submitted transaction is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            deadline: Duration::from_secs(30),
        }
    }
}

/// JSON-RPC client for a Soroban RPC endpoint
pub struct RpcClient {
    transport: Box<dyn Transport>,
    schema: RpcSchema,
    next_id: AtomicU64,
    poll: PollPolicy,
}

impl RpcClient {
    /// HTTP client for the configured endpoint and RPC generation
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.rpc_url.clone())?;
        Ok(Self::with_transport(Box::new(transport), config.rpc_schema))
    }

    pub fn with_transport(transport: Box<dyn Transport>, schema: RpcSchema) -> Self {
        Self {
            transport,
            schema,
            next_id: AtomicU64::new(1),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn schema(&self) -> RpcSchema {
        self.schema
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Send one JSON-RPC request and decode its `result`
    pub async fn request<P, R>(&self, method: &str, params: Option<P>) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id();
        let body = serde_json::to_value(JsonRpcRequest::new(id, method, params))?;
        tracing::debug!(method, id, "rpc request");

        let raw = self.transport.post(method, body).await?;
        let response: JsonRpcResponse<Value> =
            serde_json::from_value(raw).map_err(|e| Error::rpc_decode(method, e))?;

        if let Some(error) = response.error {
            return Err(Error::RpcResponse {
                method: method.to_string(),
                code: error.code,
                data: error.data_text(),
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| Error::rpc_decode(method, "response had neither result nor error"))?;
        serde_json::from_value(result).map_err(|e| Error::rpc_decode(method, e))
    }

    /// Latest ledger hash, protocol version and sequence
    pub async fn query_network_state(&self) -> Result<LatestLedger> {
        self.request::<Value, _>("getLatestLedger", None).await
    }

    /// Current on-chain state of an account
    ///
    /// The address is decoded before anything is sent, so a malformed
    /// address never reaches the network.
    pub async fn query_account(&self, address: &str) -> Result<AccountState> {
        let key = ledger::account_ledger_key(address)?;

        let entry = match self.schema {
            RpcSchema::Current => {
                let result: LedgerEntriesResult = self
                    .request("getLedgerEntries", Some(json!({ "keys": [key] })))
                    .await?;
                result.entries.unwrap_or_default().into_iter().next()
            }
            RpcSchema::Legacy => {
                match self
                    .request::<_, LedgerEntryResult>("getLedgerEntry", Some(json!({ "key": key })))
                    .await
                {
                    Ok(result) => Some(result),
                    // Legacy servers report a missing entry as an RPC error
                    Err(Error::RpcResponse { ref message, .. })
                        if message.to_ascii_lowercase().contains("not found") =>
                    {
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match entry {
            Some(entry) if !entry.xdr.is_empty() => ledger::decode_account_entry(&entry.xdr),
            _ => Err(Error::AccountNotFound(address.to_string())),
        }
    }

    /// Status of a previously submitted transaction
    pub async fn query_transaction_status(&self, hash: &str) -> Result<TransactionOutcome> {
        let method = match self.schema {
            RpcSchema::Current => "getTransaction",
            RpcSchema::Legacy => "getTransactionStatus",
        };
        let mut outcome: TransactionOutcome =
            self.request(method, Some(json!({ "hash": hash }))).await?;
        if outcome.id.is_empty() {
            outcome.id = hash.to_string();
        }
        Ok(outcome)
    }

    /// Submit a signed transaction and wait for it to settle
    ///
    /// Returns the outcome of the first poll reporting success. A definitive
    /// failure or an exhausted deadline stops polling immediately.
    pub async fn submit_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<TransactionOutcome> {
        let sent: SendTransactionResult = self
            .request(
                "sendTransaction",
                Some(json!({ "transaction": envelope.xdr() })),
            )
            .await?;

        let hash = sent
            .hash
            .clone()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| envelope.hash_hex());

        if sent.is_rejected() {
            return Err(Error::TransactionRejected {
                hash,
                detail: sent
                    .error_result_xdr
                    .unwrap_or_else(|| format!("status {}", sent.status)),
            });
        }
        tracing::debug!(%hash, status = %sent.status, "transaction sent");

        self.wait_for_transaction(&hash).await
    }

    /// Poll until a terminal status, bounded by the wall-clock deadline
    ///
    /// A poll still in flight when the deadline passes is abandoned.
    async fn wait_for_transaction(&self, hash: &str) -> Result<TransactionOutcome> {
        let start = Instant::now();
        let deadline = start + self.poll.deadline;
        match timeout_at(deadline, self.poll_transaction(hash, start, deadline)).await {
            Ok(result) => result,
            Err(_) => Err(self.timed_out(hash)),
        }
    }

    async fn poll_transaction(
        &self,
        hash: &str,
        start: Instant,
        deadline: Instant,
    ) -> Result<TransactionOutcome> {
        let mut ticker = interval_at(start + self.poll.interval, self.poll.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            // A delayed tick reports its scheduled time, not the current one
            let now = Instant::now();
            if now > deadline {
                return Err(self.timed_out(hash));
            }

            let outcome = self.query_transaction_status(hash).await?;
            tracing::debug!(%hash, status = %outcome.status, elapsed = ?now.duration_since(start), "polled transaction");

            if outcome.status == TxStatus::Success {
                return Ok(outcome);
            }
            if outcome.status.is_retryable() {
                continue;
            }
            return Err(Error::TransactionFailed {
                hash: hash.to_string(),
                status: outcome.status.to_string(),
                result_xdr: outcome
                    .result_xdr
                    .or_else(|| outcome.error.map(|e| e.message)),
            });
        }
    }

    fn timed_out(&self, hash: &str) -> Error {
        Error::TransactionTimeout {
            hash: hash.to_string(),
            secs: self.poll.deadline.as_secs(),
        }
    }

    /// Create and fund a fresh account from `funder`
    ///
    /// The funder's sequence is read right before the transaction is built.
    pub async fn create_funded_account(
        &self,
        funder: &Keypair,
        starting_balance: i64,
        network_passphrase: &str,
    ) -> Result<(Keypair, TransactionOutcome)> {
        let account = Keypair::random();
        let funder_state = self.query_account(&funder.address()).await?;
        let envelope = ledger::create_account_envelope(
            funder,
            funder_state.sequence,
            &account.address(),
            starting_balance,
            network_passphrase,
        )?;
        let outcome = self.submit_transaction(&envelope).await?;
        tracing::info!(account = %account.address(), "created tester account");
        Ok((account, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use stellar_xdr::curr as xdr;
    use stellar_xdr::curr::{Limits, WriteXdr};

    const PASSPHRASE: &str = "Standalone Network ; February 2017";

    type Responder = Box<dyn Fn(&str, &Value, usize) -> Value + Send + Sync>;

    /// Answers requests from a closure and records every call
    struct ScriptedTransport {
        respond: Responder,
        calls: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl ScriptedTransport {
        fn new(
            respond: impl Fn(&str, &Value, usize) -> Value + Send + Sync + 'static,
        ) -> (Self, Arc<Mutex<Vec<(String, Value)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    respond: Box::new(respond),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post(&self, method: &str, body: Value) -> Result<Value> {
            let mut calls = self.calls.lock().unwrap();
            let nth = calls.iter().filter(|(m, _)| m == method).count();
            calls.push((method.to_string(), body.clone()));
            drop(calls);
            Ok((self.respond)(method, &body["params"], nth))
        }
    }

    fn ok(result: Value) -> Value {
        json!({"jsonrpc": "2.0", "id": 1, "result": result})
    }

    fn count(calls: &Arc<Mutex<Vec<(String, Value)>>>, method: &str) -> usize {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    fn client(transport: ScriptedTransport, schema: RpcSchema) -> RpcClient {
        RpcClient::with_transport(Box::new(transport), schema)
    }

    fn envelope() -> TransactionEnvelope {
        TransactionEnvelope::new("AAAA", [7u8; 32])
    }

    fn sent(method: &str) -> Option<Value> {
        (method == "sendTransaction").then(|| ok(json!({"hash": "abc", "status": "PENDING"})))
    }

    fn account_entry_xdr(keypair: &Keypair, sequence: i64) -> String {
        xdr::LedgerEntryData::Account(xdr::AccountEntry {
            account_id: xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(
                keypair.public_key(),
            ))),
            balance: 10_000_000_000,
            seq_num: xdr::SequenceNumber(sequence),
            num_sub_entries: 0,
            inflation_dest: None,
            flags: 0,
            home_domain: xdr::String32(xdr::StringM::default()),
            thresholds: xdr::Thresholds([1, 0, 0, 0]),
            signers: xdr::VecM::default(),
            ext: xdr::AccountEntryExt::V0,
        })
        .to_xdr_base64(Limits::none())
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        let (transport, calls) = ScriptedTransport::new(|_, _, _| {
            ok(json!({"id": "ff", "protocolVersion": 20, "sequence": 5}))
        });
        let client = client(transport, RpcSchema::Current);

        client.query_network_state().await.unwrap();
        client.query_network_state().await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1["id"], json!(1));
        assert_eq!(calls[1].1["id"], json!(2));
        assert_eq!(calls[0].1["jsonrpc"], json!("2.0"));
    }

    #[tokio::test]
    async fn test_error_member_fails_request() {
        let (transport, _) = ScriptedTransport::new(|_, _, _| {
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "method not found"}})
        });
        let err = client(transport, RpcSchema::Current)
            .query_network_state()
            .await
            .unwrap_err();
        match err {
            Error::RpcResponse { method, code, .. } => {
                assert_eq!(method, "getLatestLedger");
                assert_eq!(code, -32601);
            }
            other => panic!("expected rpc response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_address_makes_no_call() {
        let (transport, calls) = ScriptedTransport::new(|_, _, _| ok(json!({})));
        let err = client(transport, RpcSchema::Current)
            .query_account("GNOTANADDRESS")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AddressDecode(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_account_current_schema() {
        let keypair = Keypair::random();
        let entry = account_entry_xdr(&keypair, 99);
        let (transport, calls) = ScriptedTransport::new(move |_, _, _| {
            ok(json!({"entries": [{"xdr": entry.clone()}], "latestLedger": 10}))
        });
        let state = client(transport, RpcSchema::Current)
            .query_account(&keypair.address())
            .await
            .unwrap();

        assert_eq!(state.id, keypair.address());
        assert_eq!(state.sequence, 99);
        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "getLedgerEntries");
        assert!(calls[0].1["params"]["keys"].is_array());
    }

    #[tokio::test]
    async fn test_query_account_legacy_schema() {
        let keypair = Keypair::random();
        let entry = account_entry_xdr(&keypair, 3);
        let (transport, calls) = ScriptedTransport::new(move |_, _, _| {
            ok(json!({"xdr": entry.clone(), "lastModifiedLedgerSeq": "4"}))
        });
        let state = client(transport, RpcSchema::Legacy)
            .query_account(&keypair.address())
            .await
            .unwrap();

        assert_eq!(state.sequence, 3);
        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].0, "getLedgerEntry");
        assert!(calls[0].1["params"]["key"].is_string());
    }

    #[tokio::test]
    async fn test_query_account_without_entries_is_not_found() {
        let address = Keypair::random().address();
        let (transport, _) =
            ScriptedTransport::new(|_, _, _| ok(json!({"entries": null, "latestLedger": 10})));
        let err = client(transport, RpcSchema::Current)
            .query_account(&address)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(a) if a == address));
    }

    #[tokio::test]
    async fn test_legacy_not_found_error_is_account_not_found() {
        let address = Keypair::random().address();
        let (transport, _) = ScriptedTransport::new(|_, _, _| {
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32600, "message": "not found"}})
        });
        let err = client(transport, RpcSchema::Legacy)
            .query_account(&address)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(a) if a == address));
    }

    #[tokio::test]
    async fn test_legacy_other_errors_pass_through() {
        let (transport, _) = ScriptedTransport::new(|_, _, _| {
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32603, "message": "database locked"}})
        });
        let err = client(transport, RpcSchema::Legacy)
            .query_account(&Keypair::random().address())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RpcResponse { code: -32603, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_forever_times_out_after_deadline() {
        let (transport, calls) = ScriptedTransport::new(|method, _, _| {
            sent(method).unwrap_or_else(|| ok(json!({"status": "NOT_FOUND"})))
        });
        let start = Instant::now();
        let err = client(transport, RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TransactionTimeout { secs: 30, .. }));
        // Polls at 3s, 6s, ... 30s and nothing after the deadline
        assert_eq!(count(&calls, "getTransaction"), 10);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    /// Answers `getTransaction` with NOT_FOUND only after a delay
    struct SlowTransport {
        delay: Duration,
        start: Instant,
        poll_starts: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn post(&self, method: &str, _body: Value) -> Result<Value> {
            if let Some(reply) = sent(method) {
                return Ok(reply);
            }
            self.poll_starts.lock().unwrap().push(self.start.elapsed());
            tokio::time::sleep(self.delay).await;
            Ok(ok(json!({"status": "NOT_FOUND"})))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_polls_stop_at_wall_clock_deadline() {
        let start = Instant::now();
        let poll_starts = Arc::new(Mutex::new(Vec::new()));
        let transport = SlowTransport {
            delay: Duration::from_secs(10),
            start,
            poll_starts: poll_starts.clone(),
        };
        let err = RpcClient::with_transport(Box::new(transport), RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TransactionTimeout { secs: 30, .. }));
        // The poll started at 23s is cut off instead of running to 33s
        assert!(start.elapsed() < Duration::from_secs(31));
        let poll_starts = poll_starts.lock().unwrap();
        assert_eq!(
            *poll_starts,
            vec![
                Duration::from_secs(3),
                Duration::from_secs(13),
                Duration::from_secs(23)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_try_again_later_is_not_polled() {
        let (transport, calls) = ScriptedTransport::new(|_, _, _| {
            ok(json!({"hash": "abc", "status": "TRY_AGAIN_LATER"}))
        });
        let err = client(transport, RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::TransactionRejected { ref detail, .. } if detail.contains("TRY_AGAIN_LATER"))
        );
        assert_eq!(count(&calls, "getTransaction"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_stops_polling() {
        let (transport, calls) = ScriptedTransport::new(|method, _, nth| {
            sent(method).unwrap_or_else(|| {
                if nth < 2 {
                    ok(json!({"status": "PENDING"}))
                } else {
                    ok(json!({"status": "FAILED", "resultXdr": "AAAAAAAAAGT////7AAAAAA=="}))
                }
            })
        });
        let err = client(transport, RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap_err();

        match err {
            Error::TransactionFailed {
                hash,
                status,
                result_xdr,
            } => {
                assert_eq!(hash, "abc");
                assert_eq!(status, "FAILED");
                assert!(result_xdr.is_some());
            }
            other => panic!("expected failed transaction, got {other:?}"),
        }
        assert_eq!(count(&calls, "getTransaction"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_that_poll() {
        let (transport, calls) = ScriptedTransport::new(|method, _, nth| {
            sent(method).unwrap_or_else(|| {
                if nth < 3 {
                    ok(json!({"status": "pending"}))
                } else {
                    ok(json!({"status": "SUCCESS", "resultXdr": format!("poll-{nth}")}))
                }
            })
        });
        let outcome = client(transport, RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap();

        assert_eq!(outcome.status, TxStatus::Success);
        assert_eq!(outcome.result_xdr.as_deref(), Some("poll-3"));
        assert_eq!(outcome.id, "abc");
        assert_eq!(count(&calls, "getTransaction"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_status_method() {
        let (transport, calls) = ScriptedTransport::new(|method, params, _| {
            if method == "sendTransaction" {
                ok(json!({"id": "legacy-hash", "status": "pending"}))
            } else {
                assert_eq!(params["hash"], json!("legacy-hash"));
                ok(json!({"id": "legacy-hash", "status": "success"}))
            }
        });
        let outcome = client(transport, RpcSchema::Legacy)
            .submit_transaction(&envelope())
            .await
            .unwrap();

        assert_eq!(outcome.id, "legacy-hash");
        assert_eq!(count(&calls, "getTransactionStatus"), 1);
        assert_eq!(count(&calls, "getTransaction"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_error_is_not_polled() {
        let (transport, calls) = ScriptedTransport::new(|_, _, _| {
            ok(json!({"hash": "abc", "status": "ERROR", "errorResultXdr": "AAAA"}))
        });
        let err = client(transport, RpcSchema::Current)
            .submit_transaction(&envelope())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TransactionRejected { detail, .. } if detail == "AAAA"));
        assert_eq!(count(&calls, "getTransaction"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_funded_account_reads_sequence_first() {
        let funder = Keypair::random();
        let entry = account_entry_xdr(&funder, 41);
        let (transport, calls) = ScriptedTransport::new(move |method, _, _| match method {
            "getLedgerEntries" => ok(json!({"entries": [{"xdr": entry.clone()}]})),
            "sendTransaction" => ok(json!({"hash": "created", "status": "PENDING"})),
            _ => ok(json!({"status": "SUCCESS"})),
        });
        let (account, outcome) = client(transport, RpcSchema::Current)
            .create_funded_account(&funder, 100_0000000, PASSPHRASE)
            .await
            .unwrap();

        assert_ne!(account.address(), funder.address());
        assert_eq!(outcome.status, TxStatus::Success);
        let methods: Vec<String> = calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect();
        assert_eq!(
            methods,
            vec!["getLedgerEntries", "sendTransaction", "getTransaction"]
        );
    }

    mod http {
        use super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        /// Accept one request, answer it, and hand back the request body
        async fn serve_once(
            status_line: &'static str,
            body: String,
        ) -> (String, tokio::task::JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let handle = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let request_body = loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                    let text = String::from_utf8_lossy(&buf).to_string();
                    if let Some(split) = text.find("\r\n\r\n") {
                        let length = text[..split]
                            .lines()
                            .find_map(|l| {
                                let (name, value) = l.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())?
                            })
                            .unwrap_or(0);
                        if buf.len() >= split + 4 + length {
                            break text[split + 4..split + 4 + length].to_string();
                        }
                    }
                    if n == 0 {
                        break String::new();
                    }
                };
                let response = format!(
                    "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
                request_body
            });
            (url, handle)
        }

        #[tokio::test]
        async fn test_http_transport_round_trip() {
            let (url, server) = serve_once(
                "HTTP/1.1 200 OK",
                ok(json!({"id": "beef", "protocolVersion": "20", "sequence": 77})).to_string(),
            )
            .await;
            let client = RpcClient::with_transport(
                Box::new(HttpTransport::new(url).unwrap()),
                RpcSchema::Current,
            );

            let ledger = client.query_network_state().await.unwrap();
            assert_eq!(ledger.hash, "beef");
            assert_eq!(ledger.sequence, 77);

            let request: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
            assert_eq!(request["method"], json!("getLatestLedger"));
        }

        #[tokio::test]
        async fn test_http_error_status_still_reports_rpc_error() {
            let (url, _server) = serve_once(
                "HTTP/1.1 400 Bad Request",
                json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "invalid hash", "data": "odd length"}})
                    .to_string(),
            )
            .await;
            let client = RpcClient::with_transport(
                Box::new(HttpTransport::new(url).unwrap()),
                RpcSchema::Current,
            );

            let err = client.query_transaction_status("zz").await.unwrap_err();
            match err {
                Error::RpcResponse { code, data, .. } => {
                    assert_eq!(code, -32602);
                    assert_eq!(data.as_deref(), Some("odd length"));
                }
                other => panic!("expected rpc response error, got {other:?}"),
            }
        }
    }
}
