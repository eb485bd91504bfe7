//! Constants of the native chain and of the EVM execution contract deployed on it.

/// Gas units in one Tgas.
pub const TGAS: u64 = 1_000_000_000_000;

/// The maximum gas a single function call may attach (300 Tgas).
pub const MAX_GAS: u64 = 300 * TGAS;

/// The maximum length of function call arguments accepted by the chain (4 MiB).
pub const MAX_ARGS_LEN: usize = 4 * 1024 * 1024;

/// The maximum length of an account id.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Entry points of the EVM execution contract.
pub mod methods {
    /// Deploys EVM bytecode, returns the new contract's address.
    pub const DEPLOY_CODE: &str = "deploy_code";
    /// Runs a state-changing call against a deployed EVM contract.
    pub const CALL_CONTRACT: &str = "call_contract";
    /// Runs a read-only call against a deployed EVM contract.
    pub const VIEW_CALL: &str = "view_call";
    /// Returns the code at a raw 20-byte address.
    pub const GET_CODE: &str = "get_code";
    /// Returns the balance of a raw 20-byte address as a 32-byte big-endian word.
    pub const GET_BALANCE: &str = "get_balance";
    /// Returns the nonce of a raw 20-byte address as a 32-byte big-endian word.
    pub const GET_NONCE: &str = "get_nonce";
    /// Returns the 32-byte storage slot of an address, arguments are [`crate::GetStorageAtArgs`].
    pub const GET_STORAGE_AT: &str = "get_storage_at";
}
