//! Per-scenario state and working directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::common::{paths, Error, Result};
use crate::rpc::Keypair;

/// Values produced by earlier steps of a scenario and read by later ones
#[derive(Debug, Default)]
pub struct ScenarioState {
    pub deployed_contract_id: Option<String>,
    pub installed_contract_id: Option<String>,
    pub last_response: Option<String>,
    pub last_events: Vec<Value>,
    /// Identity name to public key
    pub identities: HashMap<String, String>,
    pub tester: Option<Keypair>,
}

impl ScenarioState {
    pub fn deployed_contract(&self) -> Result<&str> {
        self.deployed_contract_id
            .as_deref()
            .ok_or_else(|| Error::TestAssertion("no contract has been deployed yet".to_string()))
    }

    pub fn installed_contract(&self) -> Result<&str> {
        self.installed_contract_id
            .as_deref()
            .ok_or_else(|| Error::TestAssertion("no contract has been installed yet".to_string()))
    }

    pub fn tester(&self) -> Result<&Keypair> {
        self.tester.as_ref().ok_or_else(|| {
            Error::TestAssertion("no tester account has been created yet".to_string())
        })
    }

    pub fn identity_address(&self, name: &str) -> Result<&str> {
        self.identities
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::TestAssertion(format!("unknown identity '{name}'")))
    }
}

/// The scenario working directory, created empty and removed on drop
///
/// Removal also happens when a step panics and the runner unwinds.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Force-remove any previous contents and create the directory empty
    pub fn prepare(dir: &Path) -> Result<Self> {
        paths::recreate_dir(dir).map_err(|e| Error::Workspace {
            path: dir.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!(dir = %dir.display(), "prepared scenario workspace");
        Ok(Self {
            dir: dir.to_path_buf(),
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Remove the directory, reporting failure
    pub fn finish(mut self) -> Result<()> {
        self.removed = true;
        paths::remove_dir_forcibly(&self.dir).map_err(|e| Error::Workspace {
            path: self.dir.display().to_string(),
            error: e.to_string(),
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = paths::remove_dir_forcibly(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to remove scenario workspace");
        }
    }
}
