//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::common::{Error, Result};
use crate::workflow::{ToolKind, ToolRequirements};

/// Starting balance of a tester account, in stroops (100 XLM)
pub const DEFAULT_STARTING_BALANCE: i64 = 1_000_000_000;

/// How many ledgers back an events fetch starts from
pub const DEFAULT_EVENTS_LOOKBACK: u32 = 100;

/// Maximum number of events fetched
pub const DEFAULT_EVENTS_COUNT: u32 = 10;

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Optional shell commands to run before the steps
    pub setup: Option<Vec<SetupStep>>,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

impl TestScenario {
    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ScenarioParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| Error::ScenarioParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// External programs the steps will call
    pub fn requirements(&self) -> ToolRequirements {
        let mut needs = ToolRequirements::default();
        for step in &self.steps {
            match step {
                TestStep::Invoke { tool, .. } | TestStep::FetchEvents { tool, .. } => {
                    needs.node |= *tool == ToolKind::Nodejs;
                }
                TestStep::CreateIdentity { .. } => needs.expect = true,
                _ => {}
            }
        }
        needs
    }
}

/// A setup step that runs before the test
#[derive(Deserialize, Debug)]
pub struct SetupStep {
    /// Shell command to execute
    pub shell: String,
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Clone the example contracts and build one of them
    CompileContract {
        /// Path of the contract inside the examples repository
        contract: String,
    },
    /// Check that an account exists on the network
    VerifyAccount {
        /// Named identity to check; the configured account when absent
        identity: Option<String>,
    },
    /// Create and fund a fresh account for this scenario
    CreateTesterAccount {
        /// Balance in stroops
        starting_balance: Option<i64>,
    },
    /// Install compiled contract code
    InstallContract {
        /// Compiled contract file name
        wasm: String,
    },
    /// Deploy a contract instance
    DeployContract {
        /// Compiled contract file name
        wasm: String,
        /// Deploy from the id returned by a previous install step
        #[serde(default)]
        by_installed_hash: bool,
        /// Named identity, used together with `network`
        identity: Option<String>,
        /// Named network profile, used together with `identity`
        network: Option<String>,
    },
    /// Register a named network profile with the CLI
    CreateNetworkProfile { name: String },
    /// Register a named identity with the CLI
    CreateIdentity {
        name: String,
        /// Use the tester account's secret instead of the configured one
        #[serde(default)]
        use_tester: bool,
    },
    /// Invoke a function on the deployed contract
    Invoke {
        function: String,
        /// Contract name used in messages
        contract: String,
        /// Space separated arguments
        params: Option<String>,
        #[serde(default)]
        tool: ToolKind,
        identity: Option<String>,
        network: Option<String>,
    },
    /// Fetch recent events of the deployed contract
    FetchEvents {
        #[serde(default)]
        tool: ToolKind,
        /// Maximum number of events to fetch
        count: Option<u32>,
        /// Ledgers before the latest one to start from
        lookback: Option<u32>,
    },
    /// Check the last invocation response
    ExpectResult {
        /// Expected exact response
        equals: Option<String>,
        /// Response must be non-empty
        #[serde(default)]
        not_empty: bool,
    },
    /// Check the number of fetched events
    ExpectEvents { count: usize },
}

impl fmt::Display for TestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStep::CompileContract { contract } => write!(f, "compile {contract}"),
            TestStep::VerifyAccount { identity } => match identity {
                Some(name) => write!(f, "verify account of {name}"),
                None => f.write_str("verify account"),
            },
            TestStep::CreateTesterAccount { .. } => f.write_str("create tester account"),
            TestStep::InstallContract { wasm } => write!(f, "install {wasm}"),
            TestStep::DeployContract {
                wasm,
                by_installed_hash,
                ..
            } => {
                if *by_installed_hash {
                    write!(f, "deploy {wasm} by installed hash")
                } else {
                    write!(f, "deploy {wasm}")
                }
            }
            TestStep::CreateNetworkProfile { name } => write!(f, "network profile {name}"),
            TestStep::CreateIdentity { name, .. } => write!(f, "identity {name}"),
            TestStep::Invoke {
                function,
                contract,
                tool,
                ..
            } => write!(f, "invoke {function} on {contract} from {tool}"),
            TestStep::FetchEvents { tool, .. } => write!(f, "fetch events from {tool}"),
            TestStep::ExpectResult { equals, .. } => match equals {
                Some(expected) => write!(f, "result should be {expected}"),
                None => f.write_str("result should not be empty"),
            },
            TestStep::ExpectEvents { count } => write!(f, "expect {count} events"),
        }
    }
}
