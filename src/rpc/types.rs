//! Soroban RPC message types
//!
//! Field names follow the JSON wire format. Several fields changed shape
//! between RPC generations (numbers sent as strings, `id` vs `hash`, `null`
//! entry lists), so decoding here is deliberately lenient.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// === Envelope ===

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<P>,
}

impl<'a, P: Serialize> JsonRpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: Option<P>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 response; exactly one of `result` / `error` is meaningful
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<R> {
    #[serde(default = "Option::default")]
    pub result: Option<R>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// Structured RPC-level error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// `data` rendered as text; some servers send a string, others an object
    pub fn data_text(&self) -> Option<String> {
        match &self.data {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

// === Results ===

/// `getLatestLedger` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestLedger {
    /// Hash of the latest ledger as a hex-encoded string
    #[serde(rename = "id")]
    pub hash: String,
    /// Stellar Core protocol version associated with the ledger
    #[serde(deserialize_with = "u32_from_number_or_string")]
    pub protocol_version: u32,
    /// Sequence number of the latest ledger
    #[serde(deserialize_with = "u32_from_number_or_string")]
    pub sequence: u32,
}

/// One entry of a `getLedgerEntries` result (or the whole legacy
/// `getLedgerEntry` result)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResult {
    /// Base64 `LedgerEntryData` XDR
    #[serde(default)]
    pub xdr: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub last_modified_ledger_seq: Option<Value>,
}

/// `getLedgerEntries` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntriesResult {
    /// Newer servers send `null` rather than `[]` when nothing matched
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
    #[serde(default)]
    pub latest_ledger: Option<Value>,
}

/// `sendTransaction` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResult {
    #[serde(default, alias = "id")]
    pub hash: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

impl SendTransactionResult {
    /// The server refused the transaction, so there is nothing to poll for
    pub fn is_rejected(&self) -> bool {
        let status = self.status.trim();
        status.eq_ignore_ascii_case("ERROR") || status.eq_ignore_ascii_case("TRY_AGAIN_LATER")
    }
}

/// Snapshot of an account's on-chain state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountState {
    /// Account address (G...)
    pub id: String,
    /// Current sequence number
    pub sequence: i64,
}

/// Status of a submitted transaction
///
/// The retryable token has been spelled `NOT_FOUND`, `PENDING` and `pending`
/// by different RPC versions; all of them mean "keep polling".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxStatus {
    Success,
    Pending(String),
    Failed,
    Error,
    Other(String),
}

impl TxStatus {
    /// Polling should continue
    pub fn is_retryable(&self) -> bool {
        matches!(self, TxStatus::Pending(_))
    }

    /// No further change is expected
    pub fn is_terminal(&self) -> bool {
        !self.is_retryable()
    }

    pub fn as_str(&self) -> &str {
        match self {
            TxStatus::Success => "SUCCESS",
            TxStatus::Pending(token) => token,
            TxStatus::Failed => "FAILED",
            TxStatus::Error => "ERROR",
            TxStatus::Other(token) => token,
        }
    }
}

impl From<String> for TxStatus {
    fn from(token: String) -> Self {
        let upper = token.trim().to_ascii_uppercase();
        match upper.as_str() {
            "SUCCESS" => TxStatus::Success,
            "NOT_FOUND" | "PENDING" => TxStatus::Pending(token),
            "FAILED" => TxStatus::Failed,
            "ERROR" => TxStatus::Error,
            _ => TxStatus::Other(token),
        }
    }
}

impl From<TxStatus> for String {
    fn from(status: TxStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `getTransaction` / `getTransactionStatus` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    #[serde(default, alias = "hash")]
    pub id: String,
    pub status: TxStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_xdr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_xdr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_meta_xdr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

fn u32_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
