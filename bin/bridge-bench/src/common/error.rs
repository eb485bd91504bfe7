use alloy_primitives::hex::FromHexError;
use evm_bridge::{AbiError, BridgeError};

/// Errors of the bench commands
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Bridge operation failed
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// Contract ABI error
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Benchmark plan could not be parsed
    #[error("Invalid benchmark plan: {0}")]
    InvalidPlan(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logging could not be set up
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Result type for the bench commands
pub type Result<T> = std::result::Result<T, BenchError>;
