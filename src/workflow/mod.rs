//! Contract developer workflow driver
//!
//! Compiles the example contracts and drives the two client tools. Both tools
//! implement [`ContractTool`] so scenario steps can pick one by [`ToolKind`].

pub mod cli;
pub mod events;
pub mod nodejs;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{paths, Config, Error, Result};
use crate::process::{CommandOutput, ToolCommand};

pub use cli::{DeploySource, SorobanCli};
pub use events::parse_events;
pub use nodejs::NodeJsClient;

/// A contract function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Deployed contract id
    pub contract_id: String,
    /// Human name of the contract, used in error messages
    pub contract_name: String,
    pub function: String,
    /// Space separated function arguments
    pub params: Option<String>,
}

/// Named identity and network profile previously registered with the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub identity: String,
    pub network: String,
}

/// Which events to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub contract_id: String,
    pub start_ledger: u32,
    pub count: u32,
}

/// Client used to talk to deployed contracts
#[async_trait]
pub trait ContractTool: Send + Sync {
    /// Name used in error messages
    fn name(&self) -> &'static str;

    /// Invoke with the configured secret key and network passphrase
    async fn invoke(&self, call: &Invocation) -> Result<String>;

    /// Invoke using a named identity and network profile
    async fn invoke_with_profile(&self, call: &Invocation, profile: &Profile) -> Result<String>;

    /// Fetch contract events as JSON objects
    async fn events(&self, query: &EventQuery) -> Result<Vec<Value>>;
}

/// Tool selector used by scenario steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    #[default]
    Cli,
    Nodejs,
}

impl FromStr for ToolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLI" => Ok(ToolKind::Cli),
            "NODEJS" => Ok(ToolKind::Nodejs),
            other => Err(Error::Config(format!(
                "unknown tool '{other}', expected CLI or NODEJS"
            ))),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Cli => f.write_str("CLI"),
            ToolKind::Nodejs => f.write_str("NODEJS"),
        }
    }
}

/// Build the tool for a kind
pub fn tool(kind: ToolKind, config: Arc<Config>) -> Box<dyn ContractTool> {
    match kind {
        ToolKind::Cli => Box::new(SorobanCli::new(config)),
        ToolKind::Nodejs => Box::new(NodeJsClient::new(config)),
    }
}

/// Run a command and fail with `operation of subject` on a non-zero exit
pub(crate) async fn run_checked(
    command: ToolCommand,
    config: &Config,
    operation: &str,
    subject: &str,
) -> Result<CommandOutput> {
    let output = command.run(config.verbose).await?;
    if !output.success() {
        let detail = if output.stderr.is_empty() {
            output.stdout_text()
        } else {
            crate::common::joined_output(&output.stderr)
        };
        return Err(Error::tool_failed(
            operation,
            subject,
            output.exit_code,
            &detail,
        ));
    }
    Ok(output)
}

/// First stdout line, or a missing-output error naming the operation
pub(crate) fn first_line(output: &CommandOutput, operation: &str, subject: &str) -> Result<String> {
    output
        .first_line()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::missing_output(operation, subject))
}

/// All stdout text, or a missing-output error naming the operation
pub(crate) fn response_text(
    output: &CommandOutput,
    operation: &str,
    subject: &str,
) -> Result<String> {
    let text = output.stdout_text();
    if text.is_empty() {
        return Err(Error::missing_output(operation, subject));
    }
    Ok(text)
}

/// Clone the example contracts at the pinned commit and build one of them
pub async fn compile_contract(config: &Config, subpath: &str) -> Result<()> {
    let repo = &config.examples_repo_url;
    let checkout = paths::examples_dir(&config.working_dir);

    run_checked(
        ToolCommand::new("git")
            .arg("clone")
            .arg(repo.as_str())
            .arg(checkout.display().to_string()),
        config,
        "git clone",
        repo,
    )
    .await?;

    run_checked(
        ToolCommand::new("git")
            .args(["checkout", config.examples_git_hash.as_str()])
            .current_dir(&checkout),
        config,
        &format!("git checkout {}", config.examples_git_hash),
        repo,
    )
    .await?;

    run_checked(
        ToolCommand::new("cargo")
            .args([
                "build",
                "--config",
                "net.git-fetch-with-cli=true",
                "--target",
                paths::WASM_TARGET,
                "--release",
            ])
            .current_dir(checkout.join(subpath)),
        config,
        "cargo build",
        &format!("{repo}/{subpath}"),
    )
    .await?;

    tracing::info!(contract = subpath, "compiled example contract");
    Ok(())
}

/// External programs a suite needs beyond the always-required ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolRequirements {
    pub node: bool,
    pub expect: bool,
}

/// Verify that required programs are on PATH and match any version pins
pub async fn preflight(config: &Config, needs: ToolRequirements) -> Result<()> {
    let mut programs = vec!["soroban", "git", "cargo"];
    if needs.node {
        programs.push("node");
    }
    if needs.expect {
        programs.push("expect");
    }
    for program in programs {
        let path = which::which(program).map_err(|_| Error::ToolNotFound(program.to_string()))?;
        tracing::debug!(program, path = %path.display(), "found tool");
    }

    if let Some(expected) = &config.cli_version {
        let output = run_checked(
            ToolCommand::new("soroban").arg("version"),
            config,
            "soroban version",
            "soroban cli",
        )
        .await?;
        check_version("soroban", expected, &output.stdout_text())?;
    }

    if needs.node {
        if let Some(expected) = &config.js_client_version {
            let output = run_checked(
                ToolCommand::new("node")
                    .args(["-p", "require('soroban-client/package.json').version"]),
                config,
                "version check",
                "soroban-client",
            )
            .await?;
            check_version("soroban-client", expected, &output.stdout_text())?;
        }
    }

    Ok(())
}

/// Compare the first version found in `reported` against a pin
///
/// A pin that is a full version must match exactly; anything else is read as
/// a semver requirement such as `>=20.0.0`.
pub fn check_version(tool: &str, expected: &str, reported: &str) -> Result<()> {
    let mismatch = || Error::ToolVersion {
        tool: tool.to_string(),
        expected: expected.to_string(),
        found: reported.lines().next().unwrap_or_default().to_string(),
    };

    let found = reported
        .split_whitespace()
        .map(|token| token.trim_start_matches('v'))
        .find_map(|token| semver::Version::parse(token).ok())
        .ok_or_else(mismatch)?;

    let matches = match semver::Version::parse(expected.trim_start_matches('v')) {
        Ok(pinned) => pinned == found,
        Err(_) => semver::VersionReq::parse(expected)
            .map_err(|e| Error::Config(format!("invalid version pin '{expected}': {e}")))?
            .matches(&found),
    };

    if matches {
        Ok(())
    } else {
        Err(mismatch())
    }
}
