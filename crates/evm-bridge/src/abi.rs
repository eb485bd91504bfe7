//! Encoding of contract calls from a JSON ABI.

use std::path::Path;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;

/// Errors raised while encoding or decoding calls.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    /// The ABI has no function of that name
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),

    /// No overload of the function takes that many arguments
    #[error("Method '{method}' takes {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Method name
        method: String,
        /// Parameter count of the first overload
        expected: usize,
        /// Number of given arguments
        got: usize,
    },

    /// An argument or return value does not fit the declared type
    #[error("Invalid value for '{method}': {source}")]
    Coerce {
        /// Method name
        method: String,
        /// Underlying error
        #[source]
        source: alloy_dyn_abi::Error,
    },

    /// The ABI file is not valid JSON ABI
    #[error("Invalid ABI: {0}")]
    Json(#[from] serde_json::Error),
}

/// A contract ABI, used to build call inputs from method names and textual arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAbi {
    abi: JsonAbi,
}

impl ContractAbi {
    /// Loads a JSON ABI file. Both a bare ABI array and a compiler artifact with an `abi`
    /// field are accepted.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Parses a JSON ABI.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let abi = match value {
            serde_json::Value::Object(mut artifact) if artifact.contains_key("abi") => {
                serde_json::from_value(artifact.remove("abi").unwrap_or_default())?
            }
            other => serde_json::from_value(other)?,
        };
        Ok(Self { abi })
    }

    /// The parsed ABI.
    pub const fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Looks up the overload of `method` that takes `arg_count` arguments.
    pub fn function(&self, method: &str, arg_count: usize) -> Result<&Function, AbiError> {
        let overloads =
            self.abi.function(method).ok_or_else(|| AbiError::UnknownMethod(method.to_string()))?;
        overloads.iter().find(|f| f.inputs.len() == arg_count).ok_or_else(|| {
            AbiError::ArgumentCount {
                method: method.to_string(),
                expected: overloads.first().map_or(0, |f| f.inputs.len()),
                got: arg_count,
            }
        })
    }

    /// Encodes a call of `method`: selector followed by the arguments, each coerced from its
    /// textual form to the declared parameter type.
    pub fn encode_call(&self, method: &str, args: &[String]) -> Result<Bytes, AbiError> {
        let function = self.function(method, args.len())?;
        let coerce = |source| AbiError::Coerce { method: method.to_string(), source };

        let values = function
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| param.resolve()?.coerce_str(arg))
            .collect::<Result<Vec<_>, _>>()
            .map_err(coerce)?;
        function.abi_encode_input(&values).map(Bytes::from).map_err(coerce)
    }

    /// Decodes the return value of `method`.
    pub fn decode_output(
        &self,
        method: &str,
        arg_count: usize,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, AbiError> {
        let function = self.function(method, arg_count)?;
        function
            .abi_decode_output(data, true)
            .map_err(|source| AbiError::Coerce { method: method.to_string(), source })
    }
}

/// Renders a decoded value the way it would be written as an argument.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::FixedBytes(word, size) => alloy_primitives::hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(b) => alloy_primitives::hex::encode_prefixed(b),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", values.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        DynSolValue::Tuple(values) => {
            format!("({})", values.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        other => format!("{other:?}"),
    }
}
