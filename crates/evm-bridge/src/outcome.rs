//! Execution outcomes as a tree of receipts.
//!
//! The root of an [`ExecutionOutcome`] is the transaction itself, its children are the
//! receipts it produced, and so on for cross-contract calls. Children are kept in execution
//! order, so a pre-order walk visits outcomes in the order the chain executed them.

use std::collections::{HashMap, HashSet};

use alloy_primitives::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::{
    rpc::{ExecutionStatusView, FinalExecutionOutcomeView, OutcomeView, OutcomeWithIdView},
    BridgeError, CryptoHash, Result,
};

/// Status of one node of the outcome tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Finished with a return value
    SuccessValue(Bytes),
    /// Finished by handing over to another receipt
    SuccessReceiptId(CryptoHash),
    /// Failed with the chain-reported reason
    Failure(String),
}

/// Outcome of a transaction or receipt, with the outcomes of the receipts it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Transaction hash or receipt id
    pub id: CryptoHash,
    /// Status
    pub status: ExecutionStatus,
    /// Gas burnt by this node alone
    pub gas_burnt: u64,
    /// Log lines of this node
    pub logs: Vec<String>,
    /// Outcomes of the produced receipts, in execution order
    pub receipts: Vec<ExecutionOutcome>,
}

impl ExecutionOutcome {
    /// Creates a leaf.
    pub const fn new(id: CryptoHash, status: ExecutionStatus, gas_burnt: u64) -> Self {
        Self { id, status, gas_burnt, logs: Vec::new(), receipts: Vec::new() }
    }

    /// Appends a receipt outcome.
    pub fn with_receipt(mut self, receipt: Self) -> Self {
        self.receipts.push(receipt);
        self
    }

    /// Appends a log line.
    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.logs.push(log.into());
        self
    }

    /// Iterates over all nodes in execution order (pre-order).
    pub fn iter(&self) -> OutcomeIter<'_> {
        OutcomeIter { stack: vec![self] }
    }

    /// The EVM-level result: the last non-empty `SuccessValue` in execution order.
    ///
    /// Intermediate receipts of cross-contract calls are skipped this way, and so are the
    /// empty values receipts return when they only refund or log.
    pub fn last_result(&self) -> Option<&Bytes> {
        self.iter()
            .filter_map(|node| match &node.status {
                ExecutionStatus::SuccessValue(value) if !value.is_empty() => Some(value),
                _ => None,
            })
            .last()
    }

    /// The first failure in execution order.
    pub fn first_failure(&self) -> Option<&str> {
        self.iter().find_map(|node| match &node.status {
            ExecutionStatus::Failure(reason) => Some(reason.as_str()),
            _ => None,
        })
    }

    /// Whether no node failed.
    pub fn is_success(&self) -> bool {
        self.first_failure().is_none()
    }

    /// All log lines in execution order.
    pub fn all_logs(&self) -> impl Iterator<Item = &str> {
        self.iter().flat_map(|node| node.logs.iter().map(String::as_str))
    }

    /// Builds the tree from the RPC view.
    ///
    /// Receipts hang below the node that lists them in `receipt_ids`. Receipts that are not
    /// reachable from the transaction are appended to the root in listed order, and a receipt
    /// is attached at most once.
    pub fn from_view(view: FinalExecutionOutcomeView) -> Result<Self> {
        let order: Vec<CryptoHash> = view.receipts_outcome.iter().map(|r| r.id).collect();
        let mut pending: HashMap<CryptoHash, OutcomeView> =
            view.receipts_outcome.into_iter().map(|r| (r.id, r.outcome)).collect();
        let mut attached = HashSet::new();

        let OutcomeWithIdView { id, outcome } = view.transaction_outcome;
        let mut root = build_node(id, outcome, &mut pending, &mut attached)?;

        for id in order {
            if let Some(outcome) = pending.remove(&id) {
                attached.insert(id);
                let orphan = build_node(id, outcome, &mut pending, &mut attached)?;
                root.receipts.push(orphan);
            }
        }
        Ok(root)
    }
}

impl<'a> IntoIterator for &'a ExecutionOutcome {
    type Item = &'a ExecutionOutcome;
    type IntoIter = OutcomeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<FinalExecutionOutcomeView> for ExecutionOutcome {
    type Error = BridgeError;

    fn try_from(view: FinalExecutionOutcomeView) -> Result<Self> {
        Self::from_view(view)
    }
}

fn build_node(
    id: CryptoHash,
    outcome: OutcomeView,
    pending: &mut HashMap<CryptoHash, OutcomeView>,
    attached: &mut HashSet<CryptoHash>,
) -> Result<ExecutionOutcome> {
    let status = match outcome.status {
        ExecutionStatusView::SuccessValue(encoded) => {
            ExecutionStatus::SuccessValue(decode_value(&encoded)?)
        }
        ExecutionStatusView::SuccessReceiptId(receipt_id) => {
            ExecutionStatus::SuccessReceiptId(receipt_id)
        }
        ExecutionStatusView::Failure(error) => ExecutionStatus::Failure(failure_reason(&error)),
        ExecutionStatusView::Unknown => {
            return Err(BridgeError::InvalidResponse(format!("outcome {id} is not final")));
        }
    };

    let mut receipts = Vec::with_capacity(outcome.receipt_ids.len());
    for receipt_id in outcome.receipt_ids {
        if !attached.insert(receipt_id) {
            continue;
        }
        // Receipts of the outcome view that are missing are still executing or were pruned.
        if let Some(receipt) = pending.remove(&receipt_id) {
            receipts.push(build_node(receipt_id, receipt, pending, attached)?);
        }
    }

    Ok(ExecutionOutcome { id, status, gas_burnt: outcome.gas_burnt, logs: outcome.logs, receipts })
}

/// Decodes a base64 return value.
pub fn decode_value(encoded: &str) -> Result<Bytes> {
    STANDARD
        .decode(encoded)
        .map(Bytes::from)
        .map_err(|e| BridgeError::InvalidResponse(format!("invalid base64 value: {e}")))
}

/// Extracts the human-readable reason of a failure.
///
/// Contract panics, which carry the EVM revert message, are nested in the chain's error as an
/// `ExecutionError` string; that string is returned verbatim. Any other error is returned as
/// its compact JSON.
pub fn failure_reason(error: &Value) -> String {
    fn find_execution_error(value: &Value) -> Option<&str> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reason)) = map.get("ExecutionError") {
                    return Some(reason);
                }
                map.values().find_map(find_execution_error)
            }
            _ => None,
        }
    }

    match error {
        Value::String(reason) => reason.clone(),
        other => find_execution_error(other).map_or_else(|| other.to_string(), str::to_string),
    }
}

/// Pre-order iterator over an [`ExecutionOutcome`] tree.
#[derive(Debug)]
pub struct OutcomeIter<'a> {
    stack: Vec<&'a ExecutionOutcome>,
}

impl<'a> Iterator for OutcomeIter<'a> {
    type Item = &'a ExecutionOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.receipts.iter().rev());
        Some(node)
    }
}
