//! CLI command definitions
//!
//! Defines the clap commands for the system-test CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run YAML test scenarios against the target network
    Run {
        /// Scenario files or directories (default: FeaturePath)
        paths: Vec<PathBuf>,

        /// Stop after the first failing scenario
        #[arg(long)]
        stop_on_failure: bool,

        /// Echo command output as it is produced
        #[arg(long, short)]
        verbose: bool,

        /// Skip the PATH and version checks of external tools
        #[arg(long)]
        skip_preflight: bool,
    },

    /// Show the latest ledger of the target network
    Ledger,

    /// Show the on-chain state of an account
    Account {
        /// Account address (default: TargetNetworkPublicKey)
        address: Option<String>,
    },

    /// Show the status of a submitted transaction
    #[command(name = "tx-status")]
    TxStatus {
        /// Hex transaction hash
        hash: String,
    },

    /// Submit a signed transaction envelope and wait for it to settle
    Submit {
        /// Base64 transaction envelope XDR
        envelope: String,
    },
}

impl Commands {
    /// Whether the command asked for verbose output
    pub fn verbose(&self) -> bool {
        matches!(self, Commands::Run { verbose: true, .. })
    }
}
