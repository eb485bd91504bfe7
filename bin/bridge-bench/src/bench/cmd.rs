use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Parser;
use evm_bridge::{rpc::NativeRpc, BenchmarkResult, ContractAbi, EvmBridge};
use tracing::{info, warn};

use super::BenchPlan;
use crate::{
    common::{load_hex, BenchError, Result},
    deploy::DEPLOY_OPERATION,
};

/// Deploy a contract and measure the gas of a sequence of calls
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Benchmark plan (JSON)
    #[arg(long)]
    pub plan: PathBuf,
}

/// Results of a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchReport {
    /// Address of the deployed contract
    pub contract: Address,
    /// Deployment first, then each call in plan order
    pub results: Vec<BenchmarkResult>,
}

impl Cmd {
    /// Runs the plan and prints one line per operation.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<BenchReport> {
        let plan = BenchPlan::load(&self.plan)?;
        run_plan(bridge, &plan).await
    }
}

/// Deploys the plan's contract, then sends each planned call. Stops at the first failure.
pub async fn run_plan<C: NativeRpc>(bridge: &EvmBridge<C>, plan: &BenchPlan) -> Result<BenchReport> {
    let abi = plan.abi.as_ref().map(ContractAbi::load).transpose()?;
    let calls: Vec<_> = match &abi {
        Some(abi) => plan.calls.iter().map(|call| (abi, call)).collect(),
        None if plan.calls.is_empty() => Vec::new(),
        None => return Err(BenchError::InvalidInput("a plan with calls needs an abi".to_string())),
    };

    let bytecode = load_hex(None, Some(&plan.bytecode))?.unwrap_or_default();
    let deployment = bridge.deploy_code(bytecode).await?;
    let deployed = BenchmarkResult::new(DEPLOY_OPERATION, deployment.gas);
    println!("{deployed}");
    println!("{}", deployment.address);
    let mut results = vec![deployed];

    for (abi, call) in calls {
        let input = abi.encode_call(&call.method, &call.args)?;
        let from = match &call.from {
            Some(from) => from,
            None => bridge.config().signer()?,
        };
        info!(name = %call.name, method = %call.method, %from, "Running benchmark call");

        let output = bridge
            .call_contract(deployment.address, input, call.value, from)
            .await
            .inspect_err(|err| warn!(name = %call.name, %err, "Benchmark call failed"))?;
        let result = BenchmarkResult::new(call.name.clone(), output.gas);
        println!("{result}");
        results.push(result);
    }

    Ok(BenchReport { contract: deployment.address, results })
}
