//! JSON views returned by the native chain's RPC.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CryptoHash;

/// Status of a single transaction or receipt outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatusView {
    /// Not executed yet
    Unknown,
    /// Execution failed; the chain's structured error
    Failure(serde_json::Value),
    /// Execution finished with a base64-encoded return value
    SuccessValue(String),
    /// Execution continues in the given receipt
    SuccessReceiptId(CryptoHash),
}

/// Overall status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalExecutionStatusView {
    /// The transaction has not been processed yet
    NotStarted,
    /// The transaction is being processed
    Started,
    /// A receipt failed
    Failure(serde_json::Value),
    /// All receipts succeeded; base64-encoded value of the last one
    SuccessValue(String),
}

/// What happened when a transaction or receipt was executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeView {
    /// Log lines emitted
    #[serde(default)]
    pub logs: Vec<String>,
    /// Receipts produced, in execution order
    #[serde(default)]
    pub receipt_ids: Vec<CryptoHash>,
    /// Gas burnt by this step
    pub gas_burnt: u64,
    /// Status of this step
    pub status: ExecutionStatusView,
}

/// An [`OutcomeView`] with the id of the transaction or receipt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeWithIdView {
    /// Transaction hash or receipt id
    pub id: CryptoHash,
    /// The outcome
    pub outcome: OutcomeView,
}

/// Final outcome of a transaction and all receipts it spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalExecutionOutcomeView {
    /// Overall status
    pub status: FinalExecutionStatusView,
    /// Outcome of converting the transaction into its first receipt
    pub transaction_outcome: OutcomeWithIdView,
    /// Outcomes of all receipts, in execution order
    #[serde(default)]
    pub receipts_outcome: Vec<OutcomeWithIdView>,
}

/// Access key state returned by `view_access_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyView {
    /// Last nonce used with this key
    pub nonce: u64,
    /// Hash of the block the query was answered at
    pub block_hash: CryptoHash,
}

/// Account state returned by `view_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    /// Liquid balance
    #[serde(serialize_with = "u128_to_str", deserialize_with = "u128_from_str")]
    pub amount: u128,
    /// Hash of the deployed native contract, all zeroes if none
    #[serde(default)]
    pub code_hash: CryptoHash,
    /// Storage used by the account
    #[serde(default)]
    pub storage_usage: u64,
    /// Hash of the block the query was answered at
    pub block_hash: CryptoHash,
}

/// Result of a read-only function call returned by `call_function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFunctionView {
    /// Raw return value
    pub result: Vec<u8>,
    /// Log lines emitted
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Amounts exceed `u64` and are therefore transported as decimal strings.
fn u128_to_str<S: Serializer>(amount: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&amount.to_string())
}

fn u128_from_str<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Number(u64),
    }
    match Amount::deserialize(d)? {
        Amount::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Amount::Number(n) => Ok(n.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_variants_deserialize() {
        let unknown: ExecutionStatusView = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(unknown, ExecutionStatusView::Unknown);

        let value: ExecutionStatusView =
            serde_json::from_str(r#"{"SuccessValue":"AQI="}"#).unwrap();
        assert_eq!(value, ExecutionStatusView::SuccessValue("AQI=".to_string()));

        let failure: FinalExecutionStatusView =
            serde_json::from_str(r#"{"Failure":{"ActionError":{"index":0}}}"#).unwrap();
        assert!(matches!(failure, FinalExecutionStatusView::Failure(_)));
    }

    #[test]
    fn test_account_amount_from_string() {
        let view: AccountView = serde_json::from_str(
            r#"{
                "amount": "100000000000000000000000000",
                "code_hash": "11111111111111111111111111111111",
                "block_hash": "CktRuQ2mttgRGkXJtyksdKHjUdc2C4TgDzyB98oEzy8"
            }"#,
        )
        .unwrap();
        assert_eq!(view.amount, 100_000_000_000_000_000_000_000_000);
        assert_eq!(view.code_hash, CryptoHash::ZERO);
        assert_eq!(view.block_hash, CryptoHash::repeat_byte(3));
    }

    #[test]
    fn test_outcome_ids_are_base58() {
        let view: OutcomeWithIdView = serde_json::from_str(
            r#"{
                "id": "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi",
                "outcome": {
                    "logs": [],
                    "receipt_ids": ["cGfHiC6Kgg3FpFZvgwGcswsCRtp4aBP2fzuXRQPizuN"],
                    "gas_burnt": 2428000000000,
                    "status": { "SuccessReceiptId": "cGfHiC6Kgg3FpFZvgwGcswsCRtp4aBP2fzuXRQPizuN" }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(view.id, CryptoHash::repeat_byte(1));
        assert_eq!(view.outcome.receipt_ids, [CryptoHash::repeat_byte(9)]);
        assert_eq!(
            view.outcome.status,
            ExecutionStatusView::SuccessReceiptId(CryptoHash::repeat_byte(9))
        );
    }
}
