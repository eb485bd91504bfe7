//! Translation of EVM-style calls into native transactions.
//!
//! Every EVM operation becomes a single function call on the EVM execution contract. The
//! arguments are JSON objects with hex-encoded byte fields (lowercase, no `0x` prefix):
//!
//! | method          | native function  | arguments                                           |
//! |-----------------|------------------|-----------------------------------------------------|
//! | `DeployCode`    | `deploy_code`    | `{"bytecode"}`                                      |
//! | `CallContract`  | `call_contract`  | `{"contract_address", "encoded_input", "value"}`    |
//! | `ViewCall`      | `view_call`      | `{"contract_address", "encoded_input", "sender"}`   |

use alloy_primitives::{Address, Bytes, B256, U256};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::trace;

use crate::{
    constants::{methods, MAX_ARGS_LEN, MAX_GAS},
    Account, AccountId,
};

/// Errors raised while translating a call. These are input errors, the caller has to fix the
/// call before trying again.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    /// The call carries no payload where one is required
    #[error("Empty payload for {method}")]
    EmptyPayload {
        /// Native function name of the call
        method: &'static str,
    },

    /// The encoded arguments exceed the chain's limit
    #[error("Arguments of {size} bytes exceed the maximum of {max} bytes")]
    PayloadTooLarge {
        /// Encoded argument size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// The requested gas exceeds the system maximum
    #[error("Gas {gas} exceeds the maximum of {max}")]
    GasAboveMaximum {
        /// Requested gas
        gas: u64,
        /// Maximum gas per call
        max: u64,
    },

    /// Arguments could not be encoded
    #[error("Failed to encode arguments: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The EVM-level operation of an [`EvmCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmMethod {
    /// Deploy the payload as contract bytecode
    DeployCode,
    /// Call the contract at `to` with the payload as ABI-encoded input
    CallContract {
        /// EVM address of the target contract
        to: Address,
        /// Value transferred with the call
        value: U256,
    },
    /// Read-only call of the contract at `to`
    ViewCall {
        /// EVM address of the target contract
        to: Address,
    },
}

impl EvmMethod {
    /// Name of the entry point on the EVM execution contract.
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::DeployCode => methods::DEPLOY_CODE,
            Self::CallContract { .. } => methods::CALL_CONTRACT,
            Self::ViewCall { .. } => methods::VIEW_CALL,
        }
    }
}

/// An EVM-style call addressed to the EVM execution contract `contract_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmCall {
    contract_id: AccountId,
    method: EvmMethod,
    payload: Bytes,
    gas: Option<u64>,
    deposit: Option<u128>,
}

impl EvmCall {
    /// Deploys `bytecode`.
    pub fn deploy_code(contract_id: AccountId, bytecode: Bytes) -> Self {
        Self { contract_id, method: EvmMethod::DeployCode, payload: bytecode, gas: None, deposit: None }
    }

    /// Calls `to` with ABI-encoded `input`, transferring `value`.
    pub fn call_contract(contract_id: AccountId, to: Address, input: Bytes, value: U256) -> Self {
        Self {
            contract_id,
            method: EvmMethod::CallContract { to, value },
            payload: input,
            gas: None,
            deposit: None,
        }
    }

    /// Read-only call of `to` with ABI-encoded `input`.
    pub fn view_call(contract_id: AccountId, to: Address, input: Bytes) -> Self {
        Self { contract_id, method: EvmMethod::ViewCall { to }, payload: input, gas: None, deposit: None }
    }

    /// Overrides the attached gas.
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Overrides the attached deposit.
    pub fn with_deposit(mut self, deposit: u128) -> Self {
        self.deposit = Some(deposit);
        self
    }

    /// The EVM execution contract.
    pub const fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    /// The EVM-level operation.
    pub const fn method(&self) -> &EvmMethod {
        &self.method
    }

    /// Bytecode or ABI-encoded input.
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }
}

/// A function call transaction on the native chain, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransaction {
    /// The signing account
    pub signer: AccountId,
    /// The contract receiving the call
    pub receiver: AccountId,
    /// Function to invoke on the receiver
    pub function_name: String,
    /// Encoded function arguments
    pub args: Bytes,
    /// Gas attached to the call
    pub gas: u64,
    /// Deposit attached to the call
    pub deposit: u128,
}

impl NativeTransaction {
    /// Decodes the JSON arguments.
    pub fn decode_args<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.args)
    }
}

/// Arguments of `deploy_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployCodeArgs {
    /// Contract bytecode
    #[serde(with = "serde_hex::bytes")]
    pub bytecode: Bytes,
}

/// Arguments of `call_contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContractArgs {
    /// EVM address of the target contract
    #[serde(with = "serde_hex::address")]
    pub contract_address: Address,
    /// ABI-encoded input
    #[serde(with = "serde_hex::bytes")]
    pub encoded_input: Bytes,
    /// Transferred value, decimal
    #[serde(with = "serde_hex::decimal")]
    pub value: U256,
}

/// Arguments of `view_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCallArgs {
    /// EVM address of the target contract
    #[serde(with = "serde_hex::address")]
    pub contract_address: Address,
    /// ABI-encoded input
    #[serde(with = "serde_hex::bytes")]
    pub encoded_input: Bytes,
    /// EVM address the call is made from
    #[serde(with = "serde_hex::address")]
    pub sender: Address,
}

/// Arguments of `get_storage_at`. Unlike the call arguments these are borsh-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GetStorageAtArgs {
    /// Raw EVM address
    pub address: [u8; 20],
    /// Storage slot
    pub key: [u8; 32],
}

impl GetStorageAtArgs {
    /// Arguments reading `key` of `address`.
    pub fn new(address: Address, key: B256) -> Self {
        Self { address: address.into(), key: key.into() }
    }
}

/// Limits applied by the [`Translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Gas attached when the call doesn't specify any
    pub default_gas: u64,
    /// Upper bound for attached gas
    pub max_gas: u64,
    /// Upper bound for encoded arguments
    pub max_args_len: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self { default_gas: MAX_GAS, max_gas: MAX_GAS, max_args_len: MAX_ARGS_LEN }
    }
}

/// Turns [`EvmCall`]s into [`NativeTransaction`]s. Pure, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    /// Creates a translator with the given limits.
    pub const fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    /// The configured limits.
    pub const fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates `call` into a transaction signed by `signer`.
    pub fn translate(
        &self,
        call: EvmCall,
        signer: &Account,
    ) -> Result<NativeTransaction, TranslationError> {
        let function_name = call.method.function_name();
        let args = match call.method {
            EvmMethod::DeployCode => {
                if call.payload.is_empty() {
                    return Err(TranslationError::EmptyPayload { method: function_name });
                }
                serde_json::to_vec(&DeployCodeArgs { bytecode: call.payload })?
            }
            EvmMethod::CallContract { to, value } => serde_json::to_vec(&CallContractArgs {
                contract_address: to,
                encoded_input: call.payload,
                value,
            })?,
            EvmMethod::ViewCall { to } => serde_json::to_vec(&ViewCallArgs {
                contract_address: to,
                encoded_input: call.payload,
                sender: signer.evm_address(),
            })?,
        };

        if args.len() > self.config.max_args_len {
            return Err(TranslationError::PayloadTooLarge {
                size: args.len(),
                max: self.config.max_args_len,
            });
        }

        let gas = call.gas.unwrap_or(self.config.default_gas);
        if gas > self.config.max_gas {
            return Err(TranslationError::GasAboveMaximum { gas, max: self.config.max_gas });
        }

        trace!(function_name, args_len = args.len(), gas, "Translated EVM call");
        Ok(NativeTransaction {
            signer: signer.id.clone(),
            receiver: call.contract_id,
            function_name: function_name.to_string(),
            args: args.into(),
            gas,
            deposit: call.deposit.unwrap_or_default(),
        })
    }
}

/// Serde helpers for the hex and decimal fields of the call arguments.
mod serde_hex {
    pub(super) mod bytes {
        use alloy_primitives::{hex, Bytes};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(bytes: &Bytes, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&hex::encode(bytes))
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
            let s = String::deserialize(d)?;
            hex::decode(&s).map(Bytes::from).map_err(D::Error::custom)
        }
    }

    pub(super) mod address {
        use alloy_primitives::{hex, Address};
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&hex::encode(address))
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
            let s = String::deserialize(d)?;
            let bytes = hex::decode(&s).map_err(D::Error::custom)?;
            Address::try_from(bytes.as_slice()).map_err(D::Error::custom)
        }
    }

    pub(super) mod decimal {
        use alloy_primitives::U256;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&value.to_string())
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
            let s = String::deserialize(d)?;
            s.parse().map_err(D::Error::custom)
        }
    }
}
