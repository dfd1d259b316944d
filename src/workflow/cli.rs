//! `soroban` command line tool
//!
//! Each operation is a single CLI call. Commands are built by separate
//! methods so their argument lists can be checked without running anything.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::{paths, Config, Result};
use crate::process::ToolCommand;

use super::{
    first_line, parse_events, response_text, run_checked, ContractTool, EventQuery, Invocation,
    Profile,
};

const PROGRAM: &str = "soroban";

/// What a deployment starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploySource {
    /// Id (wasm hash) returned by a previous install
    InstalledHash(String),
    /// Compiled contract file name under the release target dir
    Wasm(String),
}

/// Driver for the `soroban` CLI
#[derive(Debug, Clone)]
pub struct SorobanCli {
    config: Arc<Config>,
}

impl SorobanCli {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn wasm_path(&self, file_name: &str) -> String {
        paths::wasm_artifact(&self.config.working_dir, file_name)
            .display()
            .to_string()
    }

    /// Arguments that send with the configured key instead of a profile
    fn network_key_args(&self, key_flag: &str) -> [String; 6] {
        [
            "--rpc-url".to_string(),
            self.config.rpc_url.clone(),
            key_flag.to_string(),
            self.config.secret_key.clone(),
            "--network-passphrase".to_string(),
            self.config.network_passphrase.clone(),
        ]
    }

    pub(crate) fn install_command(&self, wasm: &str) -> ToolCommand {
        ToolCommand::new(PROGRAM)
            .args(["contract", "install", "--wasm"])
            .arg(self.wasm_path(wasm))
            .args(self.network_key_args("--secret-key"))
    }

    pub(crate) fn deploy_command(&self, source: &DeploySource) -> ToolCommand {
        let command = ToolCommand::new(PROGRAM).args(["contract", "deploy"]);
        let command = match source {
            DeploySource::InstalledHash(hash) => command.arg("--wasm-hash").arg(hash.as_str()),
            DeploySource::Wasm(file) => command.arg("--wasm").arg(self.wasm_path(file)),
        };
        command.args(self.network_key_args("--secret-key"))
    }

    pub(crate) fn deploy_with_profile_command(
        &self,
        wasm: &str,
        identity: &str,
        network: &str,
    ) -> ToolCommand {
        ToolCommand::new(PROGRAM)
            .args(["contract", "deploy", "--wasm"])
            .arg(self.wasm_path(wasm))
            .args(["--network", network, "--identity", identity])
    }

    pub(crate) fn invoke_command(&self, call: &Invocation) -> ToolCommand {
        let command = ToolCommand::new(PROGRAM)
            .args(["contract", "invoke", "--id", call.contract_id.as_str()])
            .args(self.network_key_args("--source"))
            .args(["--send", "yes", "--", call.function.as_str()]);
        match call.params.as_deref().filter(|p| !p.is_empty()) {
            Some(param) => command.arg(param),
            None => command,
        }
    }

    pub(crate) fn invoke_with_profile_command(
        &self,
        call: &Invocation,
        profile: &Profile,
    ) -> ToolCommand {
        ToolCommand::new(PROGRAM)
            .args(["contract", "invoke", "--id", call.contract_id.as_str()])
            .args(["--source", profile.identity.as_str()])
            .args(["--network", profile.network.as_str()])
            .args(["--", call.function.as_str()])
            .args(call.params.as_deref().unwrap_or_default().split_whitespace())
    }

    pub(crate) fn events_command(&self, query: &EventQuery) -> ToolCommand {
        ToolCommand::new(PROGRAM)
            .arg("events")
            .args(["--start-ledger".to_string(), query.start_ledger.to_string()])
            .args(["--count".to_string(), query.count.to_string()])
            .args(["--id", query.contract_id.as_str()])
            .args(["--rpc-url", self.config.rpc_url.as_str()])
            .args([
                "--network-passphrase",
                self.config.network_passphrase.as_str(),
            ])
            .args(["--output", "json"])
    }

    /// Install a compiled contract, returning its installed id (wasm hash)
    pub async fn install(&self, wasm: &str) -> Result<String> {
        let operation = "soroban cli install";
        let output = run_checked(self.install_command(wasm), &self.config, operation, wasm).await?;
        first_line(&output, operation, wasm)
    }

    /// Deploy a contract, returning the deployed contract id
    pub async fn deploy(&self, source: &DeploySource) -> Result<String> {
        let operation = "soroban cli deployment";
        let subject = match source {
            DeploySource::InstalledHash(hash) => hash.as_str(),
            DeploySource::Wasm(file) => file.as_str(),
        };
        let output =
            run_checked(self.deploy_command(source), &self.config, operation, subject).await?;
        first_line(&output, operation, subject)
    }

    /// Deploy a compiled contract with a named identity and network profile
    pub async fn deploy_with_profile(
        &self,
        wasm: &str,
        identity: &str,
        network: &str,
    ) -> Result<String> {
        let operation = "soroban cli deployment";
        let output = run_checked(
            self.deploy_with_profile_command(wasm, identity, network),
            &self.config,
            operation,
            wasm,
        )
        .await?;
        first_line(&output, operation, wasm)
    }

    /// Register a named network profile
    pub async fn add_network_profile(
        &self,
        name: &str,
        rpc_url: &str,
        network_passphrase: &str,
    ) -> Result<()> {
        let command = ToolCommand::new(PROGRAM)
            .args(["config", "network", "add"])
            .args(["--rpc-url", rpc_url])
            .args(["--network-passphrase", network_passphrase])
            .arg(name);
        run_checked(command, &self.config, "soroban cli create network config", name).await?;
        Ok(())
    }

    /// Register a named identity from a secret key
    ///
    /// The CLI only reads the secret from its interactive prompt, so the
    /// `expect` helper script types it in.
    pub async fn add_identity(&self, name: &str, secret_key: &str) -> Result<()> {
        let command = ToolCommand::new("expect")
            .arg(self.config.identity_script.display().to_string())
            .args([name, secret_key]);
        run_checked(command, &self.config, "soroban cli create identity config", name).await?;
        Ok(())
    }
}

#[async_trait]
impl ContractTool for SorobanCli {
    fn name(&self) -> &'static str {
        "CLI"
    }

    async fn invoke(&self, call: &Invocation) -> Result<String> {
        let operation = "soroban cli invoke";
        let output = run_checked(
            self.invoke_command(call),
            &self.config,
            operation,
            &call.contract_name,
        )
        .await?;
        response_text(&output, operation, &call.contract_name)
    }

    async fn invoke_with_profile(&self, call: &Invocation, profile: &Profile) -> Result<String> {
        let operation = "soroban cli invoke";
        let output = run_checked(
            self.invoke_with_profile_command(call, profile),
            &self.config,
            operation,
            &call.contract_name,
        )
        .await?;
        response_text(&output, operation, &call.contract_name)
    }

    async fn events(&self, query: &EventQuery) -> Result<Vec<Value>> {
        let output = run_checked(
            self.events_command(query),
            &self.config,
            "soroban cli get events",
            &query.contract_id,
        )
        .await?;
        parse_events(&output.stdout)
    }
}
