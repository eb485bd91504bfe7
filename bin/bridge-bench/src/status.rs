use clap::Parser;
use evm_bridge::{
    extract_gas, rpc::NativeRpc, AccountId, CryptoHash, EvmBridge, ExecutionOutcome, GasProfile,
};

use crate::common::Result;

/// Query the outcome of an earlier transaction, e.g. after a timeout
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Transaction hash
    pub tx_hash: CryptoHash,

    /// Account that signed the transaction, defaults to `--account`
    #[arg(long)]
    pub sender: Option<AccountId>,
}

impl Cmd {
    /// Prints the outcome, or that it is not final yet. Returns the outcome if final.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<Option<ExecutionOutcome>> {
        let sender = match &self.sender {
            Some(sender) => sender,
            None => bridge.config().signer()?,
        };
        let Some(outcome) = bridge.status(self.tx_hash, sender).await? else {
            println!("{}: pending", self.tx_hash);
            return Ok(None);
        };
        println!("{}", render(&outcome));
        Ok(Some(outcome))
    }
}

/// Multi-line summary of a final outcome.
pub fn render(outcome: &ExecutionOutcome) -> String {
    let mut lines = Vec::new();
    match outcome.first_failure() {
        Some(reason) => lines.push(format!("status: failed ({reason})")),
        None => lines.push("status: success".to_string()),
    }
    if let Some(result) = outcome.last_result() {
        lines.push(format!("result: {result}"));
    }
    let profile = GasProfile::new(outcome);
    lines.push(format!("gas: {} Tgas", extract_gas(outcome)));
    lines.push(format!("  transaction: {} Tgas", profile.transaction));
    for (id, gas) in &profile.receipts {
        lines.push(format!("  receipt {id}: {gas} Tgas"));
    }
    lines.extend(outcome.all_logs().map(|log| format!("log: {log}")));
    lines.join("\n")
}
