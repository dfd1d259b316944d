//! Test runner implementation
//!
//! Runs each scenario in a freshly created working directory, threading a
//! `ScenarioState` through its steps. A failing step ends the scenario and is
//! recorded in its `TestResult`; the directory is removed either way.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;

use crate::common::{Config, Error, Result};
use crate::process::ToolCommand;
use crate::rpc::{Keypair, RpcClient};
use crate::workflow::{
    self, DeploySource, EventQuery, Invocation, Profile, SorobanCli, ToolKind, ToolRequirements,
};

use super::config::{
    TestScenario, TestStep, DEFAULT_EVENTS_COUNT, DEFAULT_EVENTS_LOOKBACK,
    DEFAULT_STARTING_BALANCE,
};
use super::state::{ScenarioState, Workspace};

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
}

impl TestResult {
    fn failed(name: impl Into<String>, steps_run: usize, steps_total: usize, error: &Error) -> Self {
        Self {
            name: name.into(),
            passed: false,
            steps_run,
            steps_total,
            error: Some(error.to_string()),
        }
    }
}

/// Results of a suite run, in execution order
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Error of the first failing scenario
    pub fn first_error(&self) -> Option<&str> {
        self.results
            .iter()
            .find(|r| !r.passed)
            .and_then(|r| r.error.as_deref())
    }

    pub fn print_summary(&self) {
        println!("\n{}", "Summary:".cyan().bold());
        for result in &self.results {
            let mark = if result.passed {
                "✓".green()
            } else {
                "✗".red()
            };
            println!(
                "  {} {} ({}/{} steps)",
                mark, result.name, result.steps_run, result.steps_total
            );
            if let Some(error) = &result.error {
                println!("      {}", error.red());
            }
        }
        let line = format!("{} passed, {} failed", self.passed(), self.failed());
        if self.all_passed() {
            println!("\n{}\n", line.green().bold());
        } else {
            println!("\n{}\n", line.red().bold());
        }
    }
}

/// Expand files and directories into a sorted list of scenario files
pub fn collect_scenarios(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && matches!(p.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
                })
                .collect();
            files.sort();
            found.extend(files);
        } else if path.is_file() {
            found.push(path.clone());
        } else {
            return Err(Error::Config(format!(
                "Scenario path '{}' does not exist",
                path.display()
            )));
        }
    }
    Ok(found)
}

/// Programs needed by all readable scenarios in the list
pub fn suite_requirements(scenarios: &[PathBuf]) -> ToolRequirements {
    scenarios
        .iter()
        .filter_map(|path| TestScenario::load(path).ok())
        .map(|scenario| scenario.requirements())
        .fold(ToolRequirements::default(), |acc, needs| ToolRequirements {
            node: acc.node || needs.node,
            expect: acc.expect || needs.expect,
        })
}

/// Run scenarios one after another
pub async fn run_suite(
    scenarios: &[PathBuf],
    config: Arc<Config>,
    stop_on_failure: bool,
    verbose: bool,
) -> Result<SuiteReport> {
    let mut report = SuiteReport::default();

    for path in scenarios {
        let result = match run_scenario(path, config.clone(), verbose).await {
            Ok(result) => result,
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), path.display(), e);
                TestResult::failed(path.display().to_string(), 0, 0, &e)
            }
        };
        let failed = !result.passed;
        report.results.push(result);

        if failed && stop_on_failure {
            tracing::info!("stopping after first failing scenario");
            break;
        }
    }

    Ok(report)
}

/// Services a step may call
struct StepContext {
    config: Arc<Config>,
    rpc: RpcClient,
    cli: SorobanCli,
}

/// Run a test scenario from a YAML file
pub async fn run_scenario(path: &Path, config: Arc<Config>, verbose: bool) -> Result<TestResult> {
    let scenario = TestScenario::load(path)?;
    let steps_total = scenario.steps.len();

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    let workspace = Workspace::prepare(&config.working_dir)?;
    let outcome = run_in_workspace(&scenario, &workspace, config, verbose).await;
    let cleanup = workspace.finish();

    let result = match (outcome, cleanup) {
        (Ok(result), Ok(())) => result,
        (Ok(result), Err(e)) if result.passed => {
            TestResult::failed(result.name, result.steps_run, steps_total, &e)
        }
        (Ok(result), Err(e)) => {
            tracing::warn!(error = %e, "workspace cleanup failed");
            result
        }
        (Err(e), _) => TestResult::failed(scenario.name.clone(), 0, steps_total, &e),
    };

    if result.passed {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Test Passed".green().bold()
        );
    }
    Ok(result)
}

async fn run_in_workspace(
    scenario: &TestScenario,
    workspace: &Workspace,
    config: Arc<Config>,
    verbose: bool,
) -> Result<TestResult> {
    let steps_total = scenario.steps.len();

    if let Some(setup_steps) = &scenario.setup {
        println!("\n{}", "Setup:".cyan());
        for step in setup_steps {
            if verbose {
                println!("  $ {}", step.shell.dimmed());
            }
            let output = ToolCommand::new("sh")
                .args(["-c", step.shell.as_str()])
                .current_dir(workspace.path())
                .run(verbose)
                .await?;
            if !output.success() {
                let error = Error::tool_failed(
                    "setup command",
                    &step.shell,
                    output.exit_code,
                    &crate::common::joined_output(&output.stderr),
                );
                println!("  {} {}", "✗".red(), error);
                return Ok(TestResult::failed(&scenario.name, 0, steps_total, &error));
            }
            println!("  {} {}", "✓".green(), step.shell.dimmed());
        }
    }

    let ctx = StepContext {
        rpc: RpcClient::new(&config)?,
        cli: SorobanCli::new(config.clone()),
        config,
    };
    let mut state = ScenarioState::default();

    println!("\n{}", "Steps:".cyan());
    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;
        if let Err(e) = execute_step(&ctx, &mut state, step).await {
            println!("  {} Step {}: {}", "✗".red(), step_num, e);
            return Ok(TestResult::failed(&scenario.name, step_num, steps_total, &e));
        }
        println!(
            "  {} Step {}: {}",
            "✓".green(),
            step_num,
            step.to_string().dimmed()
        );
    }

    Ok(TestResult {
        name: scenario.name.clone(),
        passed: true,
        steps_run: steps_total,
        steps_total,
        error: None,
    })
}

/// Execute a single test step
async fn execute_step(ctx: &StepContext, state: &mut ScenarioState, step: &TestStep) -> Result<()> {
    match step {
        TestStep::CompileContract { contract } => {
            workflow::compile_contract(&ctx.config, contract).await
        }
        TestStep::VerifyAccount { identity } => {
            execute_verify_account(ctx, state, identity.as_deref()).await
        }
        TestStep::CreateTesterAccount { starting_balance } => {
            execute_create_tester(ctx, state, starting_balance.unwrap_or(DEFAULT_STARTING_BALANCE))
                .await
        }
        TestStep::InstallContract { wasm } => {
            state.installed_contract_id = Some(ctx.cli.install(wasm).await?);
            Ok(())
        }
        TestStep::DeployContract {
            wasm,
            by_installed_hash,
            identity,
            network,
        } => {
            let id = match (identity, network) {
                (Some(identity), Some(network)) => {
                    ctx.cli.deploy_with_profile(wasm, identity, network).await?
                }
                (None, None) => {
                    let source = if *by_installed_hash {
                        DeploySource::InstalledHash(state.installed_contract()?.to_string())
                    } else {
                        DeploySource::Wasm(wasm.clone())
                    };
                    ctx.cli.deploy(&source).await?
                }
                _ => {
                    return Err(Error::Config(
                        "deploy_contract needs both identity and network, or neither".to_string(),
                    ))
                }
            };
            state.deployed_contract_id = Some(id);
            Ok(())
        }
        TestStep::CreateNetworkProfile { name } => {
            ctx.cli
                .add_network_profile(name, &ctx.config.rpc_url, &ctx.config.network_passphrase)
                .await
        }
        TestStep::CreateIdentity { name, use_tester } => {
            let (secret, address) = if *use_tester {
                let tester = state.tester()?;
                (tester.secret(), tester.address())
            } else {
                (ctx.config.secret_key.clone(), ctx.config.public_key.clone())
            };
            ctx.cli.add_identity(name, &secret).await?;
            state.identities.insert(name.clone(), address);
            Ok(())
        }
        TestStep::Invoke {
            function,
            contract,
            params,
            tool,
            identity,
            network,
        } => {
            let call = Invocation {
                contract_id: state.deployed_contract()?.to_string(),
                contract_name: contract.clone(),
                function: function.clone(),
                params: params.clone(),
            };
            let client = workflow::tool(*tool, ctx.config.clone());
            let response = match (identity, network) {
                (Some(identity), Some(network)) => {
                    let profile = Profile {
                        identity: identity.clone(),
                        network: network.clone(),
                    };
                    client.invoke_with_profile(&call, &profile).await?
                }
                (None, None) => client.invoke(&call).await?,
                _ => {
                    return Err(Error::Config(
                        "invoke needs both identity and network, or neither".to_string(),
                    ))
                }
            };
            state.last_response = Some(response);
            Ok(())
        }
        TestStep::FetchEvents {
            tool,
            count,
            lookback,
        } => {
            execute_fetch_events(
                ctx,
                state,
                *tool,
                count.unwrap_or(DEFAULT_EVENTS_COUNT),
                lookback.unwrap_or(DEFAULT_EVENTS_LOOKBACK),
            )
            .await
        }
        TestStep::ExpectResult { equals, not_empty } => {
            check_result(state.last_response.as_deref(), equals.as_deref(), *not_empty)
        }
        TestStep::ExpectEvents { count } => {
            if state.last_events.len() != *count {
                return Err(Error::TestAssertion(format!(
                    "Expected {} events but got {}",
                    count,
                    state.last_events.len()
                )));
            }
            Ok(())
        }
    }
}

async fn execute_verify_account(
    ctx: &StepContext,
    state: &ScenarioState,
    identity: Option<&str>,
) -> Result<()> {
    let address = match identity {
        Some(name) => state.identity_address(name)?.to_string(),
        None => ctx.config.public_key.clone(),
    };
    let account = ctx.rpc.query_account(&address).await?;
    if account.id != address {
        return Err(Error::TestAssertion(format!(
            "Expected account {} but RPC returned {}",
            address, account.id
        )));
    }
    tracing::debug!(account = %account.id, sequence = account.sequence, "account found");
    Ok(())
}

async fn execute_create_tester(
    ctx: &StepContext,
    state: &mut ScenarioState,
    starting_balance: i64,
) -> Result<()> {
    let funder = Keypair::from_secret(&ctx.config.secret_key)?;
    let (tester, _outcome) = ctx
        .rpc
        .create_funded_account(&funder, starting_balance, &ctx.config.network_passphrase)
        .await?;
    state.tester = Some(tester);
    Ok(())
}

async fn execute_fetch_events(
    ctx: &StepContext,
    state: &mut ScenarioState,
    tool: ToolKind,
    count: u32,
    lookback: u32,
) -> Result<()> {
    let latest = ctx.rpc.query_network_state().await?;
    let query = EventQuery {
        contract_id: state.deployed_contract()?.to_string(),
        start_ledger: latest.sequence.saturating_sub(lookback).max(1),
        count,
    };
    state.last_events = workflow::tool(tool, ctx.config.clone())
        .events(&query)
        .await?;
    Ok(())
}

fn check_result(actual: Option<&str>, equals: Option<&str>, not_empty: bool) -> Result<()> {
    let actual = actual.unwrap_or_default();
    if let Some(expected) = equals {
        if actual != expected {
            return Err(Error::TestAssertion(format!(
                "Expected {} but got {}",
                expected, actual
            )));
        }
    }
    if not_empty && actual.is_empty() {
        return Err(Error::TestAssertion(
            "Expected a non-empty result".to_string(),
        ));
    }
    Ok(())
}
