use std::path::PathBuf;

use clap::Parser;
use evm_bridge::{rpc::NativeRpc, BenchmarkResult, Deployment, EvmBridge};
use tracing::info;

use crate::common::{load_hex, BenchError, Result};

/// Label of the deployment line in reports
pub const DEPLOY_OPERATION: &str = "Deploy Contract";

/// Deploy hex-encoded EVM bytecode
#[derive(Parser, Debug)]
pub struct Cmd {
    /// File with the hex-encoded bytecode, `-` for stdin
    #[arg(long, short = 'b')]
    pub bytecode: PathBuf,
}

impl Cmd {
    /// Deploys the bytecode, prints the gas and the new address.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<Deployment> {
        let bytecode = load_hex(None, Some(&self.bytecode))?.unwrap_or_default();
        if bytecode.is_empty() {
            return Err(BenchError::InvalidInput(format!(
                "{} contains no bytecode",
                self.bytecode.display()
            )));
        }
        info!(len = bytecode.len(), "Deploying bytecode");

        let deployment = bridge.deploy_code(bytecode).await?;
        println!("{}", BenchmarkResult::new(DEPLOY_OPERATION, deployment.gas));
        println!("{}", deployment.address);
        Ok(deployment)
    }
}
