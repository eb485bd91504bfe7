use std::{path::PathBuf, time::Duration};

use alloy_primitives::{Address, Bytes};
use clap::Parser;
use evm_bridge::{
    format_value, rpc::JsonRpcChain, AccountId, BridgeConfig, ContractAbi, EvmBridge,
    FileKeySource, InMemoryKeySource, MergeKeySource, Network, SigningKey, SubmitMode,
};
use tracing::debug;

use super::{load_hex, BenchError, Result};

/// Directory a devnet deployment drops its keys into, searched before the user's
/// credentials directory.
pub const LOCAL_KEY_DIR: &str = "neardev";

/// Where and as whom to connect.
#[derive(Debug, Clone, Parser)]
pub struct ConnectionArgs {
    /// Network preset
    #[arg(long, env = "NEAR_ENV", default_value_t = Network::Local, global = true)]
    pub network: Network,

    /// JSON-RPC endpoint, overrides the preset's node
    #[arg(long = "node-url", global = true)]
    pub node_url: Option<String>,

    /// Account that signs deployments and, unless `--from` is given, calls
    #[arg(long, env = "NEAR_ACCOUNT", global = true)]
    pub account: Option<AccountId>,

    /// Account of the EVM contract, overrides the preset's
    #[arg(long = "evm-contract", global = true)]
    pub evm_contract: Option<AccountId>,

    /// Private key of `--account` (`ed25519:<base58>`), looked up before any key directory
    #[arg(long = "private-key", env = "NEAR_PRIVATE_KEY", requires = "account", global = true)]
    pub private_key: Option<SigningKey>,

    /// Credentials directory, repeat to search several in order. Defaults to `./neardev`
    /// followed by `~/.near-credentials`.
    #[arg(long = "key-dir", global = true)]
    pub key_dirs: Vec<PathBuf>,

    /// Seconds to wait for a final outcome
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout: u64,

    /// Broadcast without waiting and poll for the outcome
    #[arg(long = "async-submit", global = true)]
    pub async_submit: bool,
}

impl ConnectionArgs {
    /// The bridge settings selected by these arguments.
    pub fn config(&self) -> Result<BridgeConfig> {
        let mode = if self.async_submit { SubmitMode::Async } else { SubmitMode::Commit };
        let mut config = BridgeConfig::for_network(self.network)?
            .with_submit_timeout(Duration::from_secs(self.timeout))
            .with_submit_mode(mode);
        if let Some(node_url) = &self.node_url {
            config = config.with_node_url(node_url.clone());
        }
        if let Some(evm_contract) = &self.evm_contract {
            config = config.with_evm_contract(evm_contract.clone());
        }
        if let Some(account) = &self.account {
            config = config.with_signer(account.clone());
        }
        Ok(config)
    }

    /// Key directories in lookup order.
    pub fn key_dirs(&self, config: &BridgeConfig) -> Vec<PathBuf> {
        if !self.key_dirs.is_empty() {
            return self.key_dirs.clone();
        }
        std::iter::once(PathBuf::from(LOCAL_KEY_DIR)).chain(config.key_dir.clone()).collect()
    }

    /// The key sources: the in-memory key first, then each key directory.
    pub fn key_source(&self, config: &BridgeConfig) -> Result<MergeKeySource> {
        let mut keys = MergeKeySource::default();
        if let Some(key) = &self.private_key {
            let signer = config.signer()?.clone();
            keys = keys.with_source(InMemoryKeySource::new().with_key(signer, key.clone()));
        }
        for dir in self.key_dirs(config) {
            debug!(dir = %dir.display(), "Searching key directory");
            keys = keys.with_source(FileKeySource::new(dir, &config.network_id));
        }
        Ok(keys)
    }

    /// Connects a bridge to the selected node.
    pub fn connect(&self) -> Result<EvmBridge<JsonRpcChain>> {
        let config = self.config()?;
        let keys = self.key_source(&config)?;
        Ok(EvmBridge::connect(config, keys)?)
    }
}

/// Which contract to call and with what input.
#[derive(Debug, Clone, Parser)]
pub struct InputArgs {
    /// Address of the EVM contract
    #[arg(long)]
    pub contract: Address,

    /// JSON ABI of the contract, used to encode `--method` and decode its result
    #[arg(long)]
    pub abi: Option<PathBuf>,

    /// Method to call
    #[arg(long, requires = "abi")]
    pub method: Option<String>,

    /// Method argument, repeat for each parameter
    #[arg(long = "arg", requires = "method", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Raw ABI-encoded input in hex
    #[arg(long, conflicts_with = "method")]
    pub input: Option<String>,

    /// File with the raw hex input, `-` for stdin
    #[arg(long = "input-file", conflicts_with_all = ["method", "input"])]
    pub input_file: Option<PathBuf>,

    /// Account the call is made from, defaults to `--account`
    #[arg(long)]
    pub from: Option<AccountId>,
}

impl InputArgs {
    /// Loads the ABI file, if any.
    pub fn load_abi(&self) -> Result<Option<ContractAbi>> {
        Ok(self.abi.as_ref().map(ContractAbi::load).transpose()?)
    }

    /// The call input: the encoded `--method` call, or the raw input. Empty if neither is
    /// given.
    pub fn encode(&self, abi: Option<&ContractAbi>) -> Result<Bytes> {
        match (&self.method, abi) {
            (Some(method), Some(abi)) => Ok(abi.encode_call(method, &self.args)?),
            (Some(_), None) => Err(BenchError::InvalidInput("--method requires --abi".to_string())),
            (None, _) => Ok(load_hex(self.input.as_deref(), self.input_file.as_deref())?
                .unwrap_or_default()),
        }
    }

    /// The calling account.
    pub fn sender<'a>(&'a self, config: &'a BridgeConfig) -> Result<&'a AccountId> {
        match &self.from {
            Some(from) => Ok(from),
            None => Ok(config.signer()?),
        }
    }

    /// Renders a return value, decoded through the ABI when the call named a method.
    pub fn render_output(&self, abi: Option<&ContractAbi>, data: &[u8]) -> Result<String> {
        match (&self.method, abi) {
            (Some(method), Some(abi)) => {
                let values = abi.decode_output(method, self.args.len(), data)?;
                Ok(values.iter().map(format_value).collect::<Vec<_>>().join(", "))
            }
            _ => Ok(alloy_primitives::hex::encode_prefixed(data)),
        }
    }
}
