use alloy_primitives::{Address, B256};
use clap::{Parser, Subcommand};
use evm_bridge::{rpc::NativeRpc, AccountId, EvmBridge};

use crate::common::{InputArgs, Result};

/// Read state without submitting a transaction
#[derive(Parser, Debug)]
pub struct Cmd {
    /// What to read
    #[command(subcommand)]
    pub query: Query,
}

/// What to read
#[derive(Subcommand, Debug)]
pub enum Query {
    /// Run a read-only contract call
    Call(InputArgs),
    /// EVM balance of an address
    Balance {
        /// EVM address
        address: Address,
    },
    /// EVM nonce of an address
    Nonce {
        /// EVM address
        address: Address,
    },
    /// Deployed code of an address
    Code {
        /// EVM address
        address: Address,
    },
    /// Value of a storage slot of an address
    Storage {
        /// EVM address
        address: Address,
        /// Storage slot
        key: B256,
    },
    /// Native balance and EVM address of an account, defaults to `--account`
    Account {
        /// Native account id
        account_id: Option<AccountId>,
    },
}

impl Cmd {
    /// Runs the query and returns the rendered result, which is also printed.
    pub async fn run<C: NativeRpc>(&self, bridge: &EvmBridge<C>) -> Result<String> {
        let rendered = match &self.query {
            Query::Call(input) => {
                let abi = input.load_abi()?;
                let data = input.encode(abi.as_ref())?;
                let from = input.sender(bridge.config())?;
                let output = bridge.view_call(input.contract, data, from).await?;
                input.render_output(abi.as_ref(), &output)?
            }
            Query::Balance { address } => bridge.evm_balance(*address).await?.to_string(),
            Query::Nonce { address } => bridge.evm_nonce(*address).await?.to_string(),
            Query::Code { address } => {
                alloy_primitives::hex::encode_prefixed(bridge.evm_code(*address).await?)
            }
            Query::Storage { address, key } => {
                bridge.evm_storage_at(*address, *key).await?.to_string()
            }
            Query::Account { account_id } => {
                let account_id = match account_id {
                    Some(id) => id,
                    None => bridge.config().signer()?,
                };
                let account = bridge.view_account(account_id).await?;
                format!(
                    "{} balance={} evm_address={}",
                    account.id,
                    account.balance.unwrap_or_default(),
                    account.evm_address()
                )
            }
        };
        println!("{rendered}");
        Ok(rendered)
    }
}
