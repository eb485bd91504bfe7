//! Connection presets and bridge settings.

use core::{fmt, str::FromStr, time::Duration};
use std::path::PathBuf;

use crate::{
    submit::{SubmitConfig, SubmitMode, DEFAULT_SUBMIT_TIMEOUT},
    tracker::DEFAULT_POLL_INTERVAL,
    AccountId, BridgeError, FileKeySource, Result, TranslatorConfig,
};

/// A native chain network with known endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Network {
    /// A node on the local machine
    #[default]
    Local,
    /// Public test network
    Testnet,
    /// Public pre-release network
    Betanet,
    /// Main network
    Mainnet,
}

impl Network {
    /// All networks.
    pub const ALL: [Self; 4] = [Self::Local, Self::Testnet, Self::Betanet, Self::Mainnet];

    /// The network id, also the name of the credentials subdirectory.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Testnet => "testnet",
            Self::Betanet => "betanet",
            Self::Mainnet => "mainnet",
        }
    }

    /// The public RPC endpoint.
    pub const fn node_url(&self) -> &'static str {
        match self {
            Self::Local => "http://localhost:3030",
            Self::Testnet => "https://rpc.testnet.near.org",
            Self::Betanet => "https://rpc.betanet.near.org",
            Self::Mainnet => "https://rpc.mainnet.near.org",
        }
    }

    /// Account of the EVM execution contract.
    pub const fn evm_contract(&self) -> &'static str {
        match self {
            Self::Local => "evm",
            Self::Testnet => "evm.testnet",
            Self::Betanet => "evm.betanet",
            Self::Mainnet => "evm.near",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Network {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "development" => Ok(Self::Local),
            "testnet" => Ok(Self::Testnet),
            "betanet" => Ok(Self::Betanet),
            "mainnet" | "production" => Ok(Self::Mainnet),
            _ => Err(BridgeError::InvalidConfig(format!("Unknown network '{s}'"))),
        }
    }
}

/// Everything needed to connect the bridge to a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Network id, selects the credentials subdirectory
    pub network_id: String,
    /// JSON-RPC endpoint of a node
    pub node_url: String,
    /// Account of the EVM execution contract
    pub evm_contract: AccountId,
    /// Default signing account
    pub signer: Option<AccountId>,
    /// Root of the credential files. `None` keeps keys in memory only.
    pub key_dir: Option<PathBuf>,
    /// Time to wait for a final outcome (60 s)
    pub submit_timeout: Duration,
    /// Interval between status queries (500 ms)
    pub poll_interval: Duration,
    /// Broadcast mode
    pub submit_mode: SubmitMode,
    /// Translation limits
    pub translator: TranslatorConfig,
}

impl BridgeConfig {
    /// Settings for a preset network, with keys from the default credentials directory.
    pub fn for_network(network: Network) -> Result<Self> {
        Ok(Self {
            network_id: network.id().to_string(),
            node_url: network.node_url().to_string(),
            evm_contract: network.evm_contract().parse()?,
            signer: None,
            key_dir: FileKeySource::default_root(),
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            submit_mode: SubmitMode::default(),
            translator: TranslatorConfig::default(),
        })
    }

    /// Sets the node endpoint.
    pub fn with_node_url(mut self, node_url: impl Into<String>) -> Self {
        self.node_url = node_url.into();
        self
    }

    /// Sets the EVM contract account.
    pub fn with_evm_contract(mut self, evm_contract: AccountId) -> Self {
        self.evm_contract = evm_contract;
        self
    }

    /// Sets the default signer.
    pub fn with_signer(mut self, signer: AccountId) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Sets the credentials root.
    pub fn with_key_dir(mut self, key_dir: impl Into<PathBuf>) -> Self {
        self.key_dir = Some(key_dir.into());
        self
    }

    /// Sets the submission timeout.
    pub const fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Sets the broadcast mode.
    pub const fn with_submit_mode(mut self, mode: SubmitMode) -> Self {
        self.submit_mode = mode;
        self
    }

    /// The default signer, or an error if none is configured.
    pub fn signer(&self) -> Result<&AccountId> {
        self.signer
            .as_ref()
            .ok_or_else(|| BridgeError::InvalidConfig("No signer account configured".to_string()))
    }

    /// Submission settings.
    pub const fn submit_config(&self) -> SubmitConfig {
        SubmitConfig {
            timeout: self.submit_timeout,
            poll_interval: self.poll_interval,
            mode: self.submit_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_round_trip() {
        for network in Network::ALL {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
        }
        assert_eq!("development".parse::<Network>().unwrap(), Network::Local);
        assert!("moonnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_local_preset() {
        let config = BridgeConfig::for_network(Network::Local).unwrap();
        assert_eq!(config.node_url, "http://localhost:3030");
        assert_eq!(config.evm_contract.as_str(), "evm");
        assert_eq!(config.submit_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.submit_mode, SubmitMode::Commit);
        assert!(config.signer().is_err());
    }
}
