//! Harness configuration loaded from environment variables
//!
//! Required keys fail startup with an error naming the key. Optional keys
//! default to empty/false, and booleans are parsed permissively: anything
//! that is not a recognised boolean spelling is treated as `false`.

use std::path::PathBuf;

use super::{Error, Result};

/// Default directory used for per-scenario workspaces
pub const DEFAULT_WORKING_DIRECTORY: &str = "test_tmp_workspace";

/// Default `expect` script used to feed secrets to the CLI identity prompt
pub const DEFAULT_IDENTITY_SCRIPT: &str = "assets/soroban_config.exp";

/// Which generation of the Soroban RPC method set the target network speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RpcSchema {
    /// `getLedgerEntry` (singular) and `getTransactionStatus`
    Legacy,
    /// `getLedgerEntries` (plural) and `getTransaction`
    #[default]
    Current,
}

impl RpcSchema {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("legacy") {
            RpcSchema::Legacy
        } else {
            RpcSchema::Current
        }
    }
}

/// Immutable harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to a scenario file or directory of scenarios
    pub feature_path: PathBuf,

    /// Git commit of the example contracts repository to build
    pub examples_git_hash: String,

    /// URL of the example contracts repository
    pub examples_repo_url: String,

    /// Soroban RPC endpoint of the target network
    pub rpc_url: String,

    /// Network passphrase of the target network
    pub network_passphrase: String,

    /// Secret key (S...) of the funded account used by the tests
    pub secret_key: String,

    /// Public key (G...) of the funded account used by the tests
    pub public_key: String,

    /// Echo subprocess output as it is produced
    pub verbose: bool,

    /// Core runs in the same container as the tests
    pub local_core: bool,

    /// Directory created fresh for each scenario
    pub working_dir: PathBuf,

    /// Expected `soroban` CLI version, if pinned
    pub cli_version: Option<String>,

    /// Expected JS soroban client version, if pinned
    pub js_client_version: Option<String>,

    /// RPC method generation to use
    pub rpc_schema: RpcSchema,

    /// Script that forwards a secret to the CLI's interactive prompt
    pub identity_script: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| Error::MissingEnv(key.to_string()));
        let optional = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Ok(Self {
            feature_path: PathBuf::from(required("FeaturePath")?),
            examples_git_hash: required("SorobanExamplesGitHash")?,
            examples_repo_url: required("SorobanExamplesRepoURL")?,
            rpc_url: required("TargetNetworkRPCURL")?,
            network_passphrase: required("TargetNetworkPassPhrase")?,
            secret_key: required("TargetNetworkSecretKey")?,
            public_key: required("TargetNetworkPublicKey")?,
            verbose: optional("VerboseOutput").is_some_and(|v| parse_bool(&v)),
            local_core: optional("LocalCore").is_some_and(|v| parse_bool(&v)),
            working_dir: optional("TestWorkingDirectory")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKING_DIRECTORY)),
            cli_version: optional("SorobanCLIVersion"),
            js_client_version: optional("JsSorobanClientVersion"),
            rpc_schema: optional("TargetNetworkRPCSchema")
                .map(|v| RpcSchema::parse(&v))
                .unwrap_or_default(),
            identity_script: optional("SorobanConfigExpectScript")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IDENTITY_SCRIPT)),
        })
    }
}

/// Permissive boolean parsing; unrecognised values are `false`
fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "t" | "T" | "TRUE" | "true" | "True")
}
