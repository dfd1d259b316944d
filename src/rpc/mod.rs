//! Soroban JSON-RPC client
//!
//! - `types`: wire messages and transaction status parsing
//! - `transport`: HTTP transport behind a trait
//! - `ledger`: strkey, XDR ledger keys, keypairs and signed envelopes
//! - `client`: queries and submit-with-polling

pub mod client;
pub mod ledger;
pub mod transport;
pub mod types;

pub use client::{PollPolicy, RpcClient};
pub use ledger::{Keypair, TransactionEnvelope};
pub use transport::{HttpTransport, Transport};
pub use types::{AccountState, LatestLedger, TransactionOutcome, TxStatus};
