use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::{
    constants::TGAS,
    rpc::{
        ExecutionStatusView, FinalExecutionOutcomeView, FinalExecutionStatusView, OutcomeView,
        OutcomeWithIdView,
    },
    CryptoHash,
};

/// The chain's structured error for a contract panic with `reason`.
pub fn execution_error(reason: &str) -> Value {
    json!({
        "ActionError": {
            "index": 0,
            "kind": { "FunctionCallError": { "ExecutionError": reason } }
        }
    })
}

/// A `SuccessValue` status holding `value`.
pub fn success_value(value: &[u8]) -> ExecutionStatusView {
    ExecutionStatusView::SuccessValue(STANDARD.encode(value))
}

/// A `Failure` status for a contract panic with `reason`.
pub fn failure(reason: &str) -> ExecutionStatusView {
    ExecutionStatusView::Failure(execution_error(reason))
}

/// Builds [`FinalExecutionOutcomeView`]s shaped like the chain's: the transaction outcome
/// hands over to the first receipt, and the first receipt produces all following ones (e.g.
/// refunds).
#[derive(Debug, Clone)]
pub struct OutcomeBuilder {
    tx_hash: CryptoHash,
    tx_gas: u64,
    receipts: Vec<(ExecutionStatusView, u64, Vec<String>)>,
}

impl Default for OutcomeBuilder {
    fn default() -> Self {
        Self::new(TGAS)
    }
}

impl OutcomeBuilder {
    /// Starts an outcome whose transaction step burns `tx_gas`.
    pub const fn new(tx_gas: u64) -> Self {
        Self { tx_hash: CryptoHash::ZERO, tx_gas, receipts: Vec::new() }
    }

    /// Sets the transaction hash.
    pub const fn tx_hash(mut self, tx_hash: CryptoHash) -> Self {
        self.tx_hash = tx_hash;
        self
    }

    /// Appends a receipt.
    pub fn receipt(mut self, status: ExecutionStatusView, gas: u64) -> Self {
        self.receipts.push((status, gas, Vec::new()));
        self
    }

    /// Appends a receipt that emitted `logs`.
    pub fn receipt_with_logs(
        mut self,
        status: ExecutionStatusView,
        gas: u64,
        logs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.receipts.push((status, gas, logs.into_iter().map(Into::into).collect()));
        self
    }

    /// Id of the `index`-th receipt.
    pub const fn receipt_id(index: usize) -> CryptoHash {
        CryptoHash::from_index(index as u64 + 1)
    }

    /// Builds the view. The final status is the first failure, or the last non-empty value.
    pub fn build(self) -> FinalExecutionOutcomeView {
        let ids: Vec<CryptoHash> = (0..self.receipts.len()).map(Self::receipt_id).collect();

        let status = self
            .receipts
            .iter()
            .find_map(|(status, ..)| match status {
                ExecutionStatusView::Failure(error) => {
                    Some(FinalExecutionStatusView::Failure(error.clone()))
                }
                _ => None,
            })
            .unwrap_or_else(|| {
                let value = self
                    .receipts
                    .iter()
                    .filter_map(|(status, ..)| match status {
                        ExecutionStatusView::SuccessValue(v) if !v.is_empty() => Some(v.clone()),
                        _ => None,
                    })
                    .last()
                    .unwrap_or_default();
                FinalExecutionStatusView::SuccessValue(value)
            });

        let transaction_outcome = OutcomeWithIdView {
            id: self.tx_hash,
            outcome: OutcomeView {
                logs: Vec::new(),
                receipt_ids: ids.first().copied().into_iter().collect(),
                gas_burnt: self.tx_gas,
                status: match ids.first() {
                    Some(first) => ExecutionStatusView::SuccessReceiptId(*first),
                    None => ExecutionStatusView::SuccessValue(String::new()),
                },
            },
        };

        let receipts_outcome = self
            .receipts
            .into_iter()
            .enumerate()
            .map(|(index, (status, gas_burnt, logs))| OutcomeWithIdView {
                id: ids[index],
                outcome: OutcomeView {
                    logs,
                    receipt_ids: if index == 0 { ids[1..].to_vec() } else { Vec::new() },
                    gas_burnt,
                    status,
                },
            })
            .collect();

        FinalExecutionOutcomeView { status, transaction_outcome, receipts_outcome }
    }
}

/// A successful outcome returning `value` from a single receipt.
pub fn success_outcome(value: &[u8], tx_gas: u64, receipt_gas: u64) -> FinalExecutionOutcomeView {
    OutcomeBuilder::new(tx_gas).receipt(success_value(value), receipt_gas).build()
}

/// An outcome whose single receipt failed with `reason`.
pub fn failure_outcome(reason: &str, tx_gas: u64, receipt_gas: u64) -> FinalExecutionOutcomeView {
    OutcomeBuilder::new(tx_gas).receipt(failure(reason), receipt_gas).build()
}
