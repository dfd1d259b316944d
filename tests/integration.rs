//! End-to-end integration tests for the system-test CLI
//!
//! These tests run the built binary with a controlled environment and
//! verify startup validation, scenario workspace handling and suite exit
//! codes. Nothing here needs a live network or the soroban toolchain.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const REQUIRED_ENV: [(&str, &str); 7] = [
    ("FeaturePath", "features"),
    ("SorobanExamplesGitHash", "main"),
    ("SorobanExamplesRepoURL", "https://example.invalid/soroban-examples"),
    // Nothing listens on the discard port, so any RPC call fails fast
    ("TargetNetworkRPCURL", "http://127.0.0.1:9/soroban/rpc"),
    ("TargetNetworkPassPhrase", "Standalone Network ; February 2017"),
    ("TargetNetworkSecretKey", "SDQNCWNNAJJUM4RXNSJHJCXDQMD6G2CFNCPMHZWGCJNJ2VQBGVVBCEGW"),
    ("TargetNetworkPublicKey", "GBZXN7PIRZGNMHGA7MUUUF4GWPY5AYPV6LY4UV2GL6VJGIQRXFDNMADI"),
];

/// Test context with a scratch directory and the binary's environment
struct TestContext {
    /// Temporary directory for this test
    temp_dir: PathBuf,
    /// Environment passed to the binary
    env: HashMap<String, String>,
}

impl TestContext {
    fn new(test_name: &str) -> Self {
        let temp_dir = env::temp_dir()
            .join("soroban-system-test-tests")
            .join(test_name);
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");

        let mut env: HashMap<String, String> = REQUIRED_ENV
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env.insert(
            "TestWorkingDirectory".to_string(),
            temp_dir.join("workspace").display().to_string(),
        );
        env.insert("FeaturePath".to_string(), temp_dir.join("features").display().to_string());

        Self { temp_dir, env }
    }

    fn workspace(&self) -> PathBuf {
        self.temp_dir.join("workspace")
    }

    fn features(&self) -> PathBuf {
        let dir = self.temp_dir.join("features");
        fs::create_dir_all(&dir).expect("Failed to create features dir");
        dir
    }

    fn write_scenario(&self, name: &str, body: &str) -> PathBuf {
        let path = self.features().join(name);
        fs::write(&path, body).expect("Failed to write scenario");
        path
    }

    /// Run the binary with only this context's environment (plus PATH)
    fn run(&self, args: &[&str]) -> CliOutput {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_soroban-system-test"));
        cmd.args(args)
            .env_clear()
            .env("PATH", env::var("PATH").unwrap_or_default())
            .env("NO_COLOR", "1")
            .envs(&self.env)
            .current_dir(&self.temp_dir);
        let output = cmd.output().expect("Failed to run soroban-system-test");

        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

#[derive(Debug)]
struct CliOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

fn assert_absent(path: &Path) {
    assert!(!path.exists(), "{} should have been removed", path.display());
}

#[test]
fn test_missing_env_names_first_key() {
    let mut ctx = TestContext::new("missing_env_all");
    ctx.env.clear();

    let output = ctx.run(&["ledger"]);

    assert_eq!(output.code, Some(1));
    assert!(
        output
            .stderr
            .contains("missing required env variable FeaturePath"),
        "stderr: {}",
        output.stderr
    );
}

#[test]
fn test_missing_env_names_the_missing_key() {
    let mut ctx = TestContext::new("missing_env_one");
    ctx.env.remove("TargetNetworkPublicKey");

    let output = ctx.run(&["ledger"]);

    assert_eq!(output.code, Some(1));
    assert!(output
        .stderr
        .contains("missing required env variable TargetNetworkPublicKey"));
}

#[test]
fn test_malformed_address_fails_before_network() {
    let ctx = TestContext::new("malformed_address");

    let output = ctx.run(&["account", "GNOTANACCOUNT"]);

    assert_eq!(output.code, Some(1));
    assert!(
        output.stderr.contains("invalid account address"),
        "stderr: {}",
        output.stderr
    );
}

#[test]
fn test_passing_scenario_sees_fresh_workspace() {
    let ctx = TestContext::new("passing_scenario");
    let workspace = ctx.workspace();
    fs::create_dir_all(workspace.join("stale")).unwrap();

    // The setup step runs after the workspace is recreated
    ctx.write_scenario(
        "empty_workspace.yaml",
        &format!(
            "name: workspace starts empty\nsetup:\n  - shell: \"test -d {ws} && test -z \\\"$(ls -A {ws})\\\"\"\nsteps: []\n",
            ws = workspace.display()
        ),
    );

    let output = ctx.run(&["run", "--skip-preflight"]);

    assert_eq!(output.code, Some(0), "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("Test Passed"));
    assert!(output.stdout.contains("1 passed, 0 failed"));
    assert_absent(&workspace);
}

#[test]
fn test_failing_scenario_exits_nonzero_and_cleans_up() {
    let ctx = TestContext::new("failing_scenario");
    let scenario = ctx.write_scenario(
        "mismatch.yaml",
        "name: result mismatch\nsteps:\n  - action: expect_result\n    equals: Hello\n",
    );

    let output = ctx.run(&["run", "--skip-preflight", scenario.to_str().unwrap()]);

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("0 passed, 1 failed"));
    assert!(output.stderr.contains("Expected Hello but got"));
    assert_absent(&ctx.workspace());
}

#[test]
fn test_stop_on_failure_skips_remaining_scenarios() {
    let ctx = TestContext::new("stop_on_failure");
    ctx.write_scenario(
        "a_fails.yaml",
        "name: first fails\nsteps:\n  - action: expect_events\n    count: 3\n",
    );
    ctx.write_scenario("b_passes.yaml", "name: second passes\nsteps: []\n");

    let output = ctx.run(&["run", "--skip-preflight", "--stop-on-failure"]);

    assert_eq!(output.code, Some(1));
    assert!(!output.stdout.contains("second passes"));
    assert!(output.stderr.contains("Expected 3 events but got 0"));
}

#[test]
fn test_empty_feature_directory_is_an_error() {
    let ctx = TestContext::new("no_scenarios");
    ctx.features();

    let output = ctx.run(&["run", "--skip-preflight"]);

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("No scenario files found"));
}

#[test]
fn test_shipped_scenarios_parse() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("features")
        .join("dapp_develop");
    let scenarios = system_test::testing::collect_scenarios(&[dir]).unwrap();
    assert!(scenarios.len() >= 4);

    for path in &scenarios {
        let scenario = system_test::testing::TestScenario::load(path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert!(!scenario.steps.is_empty(), "{} has no steps", path.display());
    }
}
