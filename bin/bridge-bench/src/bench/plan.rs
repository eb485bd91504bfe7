use std::path::{Path, PathBuf};

use alloy_primitives::U256;
use evm_bridge::AccountId;
use serde::Deserialize;

use crate::common::Result;

/// A benchmark: one contract deployment followed by calls on the deployed contract.
///
/// ```json
/// {
///   "bytecode": "zombieAttack.bin",
///   "abi": "zombieAttack.abi",
///   "calls": [
///     { "name": "Create Random Zombie", "method": "createRandomZombie", "args": ["blah"] }
///   ]
/// }
/// ```
///
/// Relative paths are resolved against the directory of the plan file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchPlan {
    /// File with the hex-encoded bytecode
    pub bytecode: PathBuf,
    /// JSON ABI of the contract, required when there are calls
    #[serde(default)]
    pub abi: Option<PathBuf>,
    /// Calls run in order after the deployment
    #[serde(default)]
    pub calls: Vec<PlannedCall>,
}

/// One call of a [`BenchPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannedCall {
    /// Label in the report
    pub name: String,
    /// ABI method
    pub method: String,
    /// Arguments in their textual form
    #[serde(default)]
    pub args: Vec<String>,
    /// Value transferred, in wei
    #[serde(default)]
    pub value: U256,
    /// Calling account, defaults to the configured signer
    #[serde(default)]
    pub from: Option<AccountId>,
}

impl BenchPlan {
    /// Reads the plan at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let plan = Self::from_json(&std::fs::read_to_string(path)?)?;
        Ok(plan.relative_to(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    /// Parses a plan. Paths are kept as written.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves relative paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.bytecode = base.join(&self.bytecode);
        self.abi = self.abi.map(|abi| base.join(abi));
        self
    }
}
