//! Error types for the system-test harness
//!
//! Messages name the operation and the contract, tool or RPC method involved
//! so a failing scenario can be diagnosed from its first reported error.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("missing required env variable {0}")]
    MissingEnv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scenario file '{path}': {reason}")]
    ScenarioParse { path: String, reason: String },

    // === RPC Errors ===
    #[error("soroban rpc {method} had transport error: {message}")]
    RpcTransport { method: String, message: String },

    #[error("soroban rpc {method}, not able to parse response: {message}")]
    RpcDecode { method: String, message: String },

    #[error("soroban rpc {method}, error on response: code {code}, {message}{}", parenthesized(.data))]
    RpcResponse {
        method: String,
        code: i64,
        message: String,
        data: Option<String>,
    },

    // === Ledger Errors ===
    #[error("invalid account address: {0}")]
    AddressDecode(String),

    #[error("unable to find account for key {0}")]
    AccountNotFound(String),

    #[error("not able to parse XDR from ledger entry response: {0}")]
    EntryDecode(String),

    #[error("XDR error: {0}")]
    Xdr(String),

    // === Transaction Errors ===
    #[error("transaction {hash} was rejected on submission: {detail}")]
    TransactionRejected { hash: String, detail: String },

    #[error("transaction {hash} ended with status {status}{}", labelled(", result ", .result_xdr))]
    TransactionFailed {
        hash: String,
        status: String,
        result_xdr: Option<String>,
    },

    #[error("transaction {hash} timed out after {secs} seconds on tx status check")]
    TransactionTimeout { hash: String, secs: u64 },

    // === Subprocess Errors ===
    #[error("Failed to start '{command}': {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' terminated without an exit code")]
    ProcessTerminated { command: String },

    #[error("Tool '{0}' not found on PATH")]
    ToolNotFound(String),

    #[error("{operation} of {subject} had error, exit code {status}{}", output_suffix(.output))]
    ToolFailed {
        operation: String,
        subject: String,
        status: i32,
        output: String,
    },

    #[error("{operation} of {subject} did not emit a successful response")]
    MissingOutput { operation: String, subject: String },

    #[error("console output {output:?} was not parseable as event json: {reason}")]
    EventsNotParseable { output: String, reason: String },

    #[error("{operation} is not supported by the {tool} tool")]
    Unsupported { tool: String, operation: String },

    #[error("Tool version mismatch for {tool}: expected {expected}, found {found}")]
    ToolVersion {
        tool: String,
        expected: String,
        found: String,
    },

    #[error("Failed to render {name} template: {reason}")]
    Template { name: String, reason: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to prepare working directory '{path}': {error}")]
    Workspace { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an RPC transport error for a method
    pub fn rpc_transport(method: &str, message: impl ToString) -> Self {
        Self::RpcTransport {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an RPC decode error for a method
    pub fn rpc_decode(method: &str, message: impl ToString) -> Self {
        Self::RpcDecode {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a subprocess failure error
    pub fn tool_failed(operation: &str, subject: &str, status: i32, output: &str) -> Self {
        Self::ToolFailed {
            operation: operation.to_string(),
            subject: subject.to_string(),
            status,
            output: output.to_string(),
        }
    }

    /// Create a missing output error
    pub fn missing_output(operation: &str, subject: &str) -> Self {
        Self::MissingOutput {
            operation: operation.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Create an unsupported tool operation error
    pub fn unsupported(tool: &str, operation: &str) -> Self {
        Self::Unsupported {
            tool: tool.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Wrap an XDR codec error
    pub fn xdr(error: impl std::fmt::Display) -> Self {
        Self::Xdr(error.to_string())
    }

    /// Whether this error was produced by a failed assertion
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::TestAssertion(_))
    }
}

fn parenthesized(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

fn labelled(label: &str, value: &Option<String>) -> String {
    value
        .as_deref()
        .map(|v| format!("{label}{v}"))
        .unwrap_or_default()
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(", output: {output}")
    }
}
