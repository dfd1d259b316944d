//! Scenario runner
//!
//! Reads YAML test scenarios and executes their steps against the target
//! network through the workflow driver and the RPC client. Each scenario
//! gets a fresh working directory and its own `ScenarioState`.

mod config;
mod runner;
mod state;

pub use config::*;
pub use runner::{collect_scenarios, run_scenario, run_suite, suite_requirements, SuiteReport, TestResult};
pub use state::{ScenarioState, Workspace};
