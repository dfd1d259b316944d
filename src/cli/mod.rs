//! CLI command handling
//!
//! Dispatches CLI commands to the scenario runner or the RPC client and
//! formats output.

use std::sync::Arc;

use serde::Serialize;

use crate::commands::Commands;
use crate::common::{Config, Error, Result};
use crate::rpc::{RpcClient, TransactionEnvelope};
use crate::testing;
use crate::workflow;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: Arc<Config>) -> Result<()> {
    match command {
        Commands::Run {
            paths,
            stop_on_failure,
            verbose,
            skip_preflight,
        } => {
            let verbose = verbose || config.verbose;
            let paths = if paths.is_empty() {
                vec![config.feature_path.clone()]
            } else {
                paths
            };

            let scenarios = testing::collect_scenarios(&paths)?;
            if scenarios.is_empty() {
                return Err(Error::Config(format!(
                    "No scenario files found in {}",
                    paths
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }

            if !skip_preflight {
                let needs = testing::suite_requirements(&scenarios);
                workflow::preflight(&config, needs).await?;
            }

            let report = testing::run_suite(&scenarios, config, stop_on_failure, verbose).await?;
            report.print_summary();

            if report.all_passed() {
                Ok(())
            } else {
                Err(Error::TestAssertion(format!(
                    "{} of {} scenarios failed, first error: {}",
                    report.failed(),
                    report.results.len(),
                    report.first_error().unwrap_or("unknown")
                )))
            }
        }

        Commands::Ledger => {
            let client = RpcClient::new(&config)?;
            print_json(&client.query_network_state().await?)
        }

        Commands::Account { address } => {
            let client = RpcClient::new(&config)?;
            let address = address.unwrap_or_else(|| config.public_key.clone());
            print_json(&client.query_account(&address).await?)
        }

        Commands::TxStatus { hash } => {
            let client = RpcClient::new(&config)?;
            print_json(&client.query_transaction_status(&hash).await?)
        }

        Commands::Submit { envelope } => {
            let client = RpcClient::new(&config)?;
            let envelope = TransactionEnvelope::from_xdr(&envelope, &config.network_passphrase)?;
            println!("Submitting transaction {}", envelope.hash_hex());
            print_json(&client.submit_transaction(&envelope).await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
