use alloy_primitives::U256;
use clap::Parser;
use evm_bridge::{rpc::NativeRpc, BenchmarkResult, CallOutput, EvmBridge};
use tracing::info;

use crate::common::{InputArgs, Result};

/// Send a state-changing call to an EVM contract
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Contract and input
    #[command(flatten)]
    pub input: InputArgs,

    /// Value transferred with the call, in wei
    #[arg(long, default_value_t = U256::ZERO)]
    pub value: U256,
}

impl Cmd {
    /// Sends the call, prints its return value and gas.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<CallOutput> {
        let abi = self.input.load_abi()?;
        let data = self.input.encode(abi.as_ref())?;
        let from = self.input.sender(bridge.config())?;
        info!(contract = %self.input.contract, %from, len = data.len(), "Calling contract");

        let output = bridge.call_contract(self.input.contract, data, self.value, from).await?;
        let operation = self.input.method.as_deref().unwrap_or("Call Contract");
        println!("Return value: {}", self.input.render_output(abi.as_ref(), &output.return_value)?);
        println!("{}", BenchmarkResult::new(operation, output.gas));
        Ok(output)
    }
}
