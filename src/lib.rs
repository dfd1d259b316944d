//! Soroban system tests
//!
//! End-to-end harness for the Soroban smart-contract developer workflow:
//! compiles example contracts, drives the `soroban` CLI and the JS client,
//! and checks on-chain results through a JSON-RPC client that submits
//! transactions and polls them to a terminal status.

pub mod cli;
pub mod commands;
pub mod common;
pub mod process;
pub mod rpc;
pub mod testing;
pub mod workflow;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use rpc::RpcClient;
