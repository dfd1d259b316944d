//! Common utilities shared by the RPC client, workflow driver and runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{Config, RpcSchema};
pub use error::{Error, Result};

/// Join captured output lines and trim surrounding whitespace
pub fn joined_output(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}
