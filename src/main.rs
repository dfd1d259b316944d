//! Soroban system tests - end-to-end checks of the contract developer workflow
//!
//! Drives the `soroban` CLI and the JS client against a live network and
//! verifies results through Soroban RPC.

use std::sync::Arc;

use clap::Parser;
use system_test::commands::Commands;
use system_test::common::{logging, Config};
use system_test::cli;

#[derive(Parser)]
#[command(name = "soroban-system-test", about = "Soroban dapp developer system tests")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A missing .env file is fine; the real environment still applies
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_cli(config.verbose || cli.command.verbose());

    if let Err(e) = cli::dispatch(cli.command, config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
