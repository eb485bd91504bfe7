use alloy_transport::TransportError;

use crate::{AbiError, AccountId, CryptoHash, TranslationError};

/// Errors surfaced by the bridge.
///
/// Every failure is returned to the immediate caller. Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// No key source holds a signing key for the account
    #[error("No signing key found for account {account_id}")]
    KeyNotFound {
        /// The account that has no key
        account_id: AccountId,
    },

    /// Key material could not be parsed or is inconsistent
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A native hash is not 32 bytes of base58
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Account id does not satisfy the chain's naming rules
    #[error("Invalid account id '{0}'")]
    InvalidAccountId(String),

    /// The EVM call could not be turned into a native transaction
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The chain executed the transaction and it failed. The reason is kept verbatim.
    #[error("Execution reverted: {0}")]
    ExecutionReverted(String),

    /// No final outcome arrived in time. The transaction may still execute, query its
    /// status before resubmitting.
    #[error("Timed out waiting for transaction {tx_hash}")]
    SubmissionTimeout {
        /// Hash of the submitted transaction
        tx_hash: CryptoHash,
    },

    /// RPC transport error
    #[error("RPC transport error: {0}")]
    Network(#[from] TransportError),

    /// The node answered with something we cannot interpret
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Contract ABI error
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Whether the outcome of the operation is unknown rather than failed.
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self, Self::SubmissionTimeout { .. })
    }
}

/// Result type for bridge operations
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
