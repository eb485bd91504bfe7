use std::path::PathBuf;

use clap::Parser;
use evm_bridge::{rpc::NativeRpc, BenchmarkResult, EvmBridge};

use crate::common::Result;

/// Install the EVM contract code on its account (devnets)
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Compiled EVM contract (wasm). Signed with the key of `--evm-contract`.
    #[arg(long)]
    pub wasm: PathBuf,
}

impl Cmd {
    /// Deploys the contract code and prints the gas it burnt.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<()> {
        let wasm = std::fs::read(&self.wasm)?;
        let submission = bridge.install_evm(wasm.into()).await?;
        println!("{}", BenchmarkResult::new("Install EVM", submission.gas()));
        Ok(())
    }
}
