//! Tests for building and walking outcome trees.

use alloy_primitives::Bytes;
use evm_bridge::{
    failure_reason,
    rpc::{
        ExecutionStatusView, FinalExecutionOutcomeView, FinalExecutionStatusView, OutcomeView,
        OutcomeWithIdView,
    },
    test_utils::{execution_error, failure, success_value, OutcomeBuilder},
    BridgeError, CryptoHash, ExecutionOutcome, ExecutionStatus,
};
use serde_json::json;

fn id(byte: u8) -> CryptoHash {
    CryptoHash::from_index(byte.into())
}

fn node(byte: u8, status: ExecutionStatusView, receipt_ids: &[u8]) -> OutcomeWithIdView {
    OutcomeWithIdView {
        id: id(byte),
        outcome: OutcomeView {
            logs: vec![format!("log {byte}")],
            receipt_ids: receipt_ids.iter().copied().map(id).collect(),
            gas_burnt: byte.into(),
            status,
        },
    }
}

#[test]
fn test_last_result_skips_intermediate_and_empty_values() {
    let view = OutcomeBuilder::new(1)
        .receipt(ExecutionStatusView::SuccessReceiptId(id(9)), 1)
        .receipt(success_value(b"intermediate"), 1)
        .receipt(success_value(b"result"), 1)
        .receipt(success_value(&[]), 1)
        .build();
    let outcome = ExecutionOutcome::from_view(view).unwrap();

    assert_eq!(outcome.last_result(), Some(&Bytes::from_static(b"result")));
    assert!(outcome.is_success());
}

#[test]
fn test_no_result_when_all_values_are_empty() {
    let view = OutcomeBuilder::new(1).receipt(success_value(&[]), 1).build();
    assert_eq!(ExecutionOutcome::from_view(view).unwrap().last_result(), None);
}

#[test]
fn test_tree_follows_receipt_ids() {
    // 0 -> 1 -> (2, 3), 2 -> 4
    let view = FinalExecutionOutcomeView {
        status: FinalExecutionStatusView::SuccessValue(String::new()),
        transaction_outcome: node(0, ExecutionStatusView::SuccessReceiptId(id(1)), &[1]),
        receipts_outcome: vec![
            node(3, success_value(b"three"), &[]),
            node(1, success_value(&[]), &[2, 3]),
            node(4, success_value(b"four"), &[]),
            node(2, success_value(&[]), &[4]),
        ],
    };
    let outcome = ExecutionOutcome::from_view(view).unwrap();

    let order: Vec<CryptoHash> = outcome.iter().map(|n| n.id).collect();
    assert_eq!(order, [id(0), id(1), id(2), id(4), id(3)]);
    assert_eq!(outcome.last_result(), Some(&Bytes::from_static(b"three")));
    assert_eq!(outcome.all_logs().collect::<Vec<_>>(), ["log 0", "log 1", "log 2", "log 4", "log 3"]);
}

#[test]
fn test_unreachable_receipts_are_kept_once() {
    let view = FinalExecutionOutcomeView {
        status: FinalExecutionStatusView::SuccessValue(String::new()),
        transaction_outcome: node(0, ExecutionStatusView::SuccessReceiptId(id(1)), &[1]),
        receipts_outcome: vec![
            node(1, success_value(&[]), &[]),
            node(5, success_value(&[]), &[6]),
            node(6, success_value(&[]), &[1]),
        ],
    };
    let outcome = ExecutionOutcome::from_view(view).unwrap();

    let order: Vec<CryptoHash> = outcome.iter().map(|n| n.id).collect();
    assert_eq!(order, [id(0), id(1), id(5), id(6)]);
    assert_eq!(outcome.iter().map(|n| n.gas_burnt).sum::<u64>(), 12);
}

#[test]
fn test_failure_reason_is_kept_verbatim() {
    let view = OutcomeBuilder::new(1)
        .receipt(failure("revert: zombie exists"), 1)
        .receipt(success_value(&[]), 1)
        .build();
    let outcome = ExecutionOutcome::from_view(view).unwrap();

    assert_eq!(outcome.first_failure(), Some("revert: zombie exists"));
    assert!(!outcome.is_success());
    assert!(matches!(
        &outcome.receipts[0].status,
        ExecutionStatus::Failure(reason) if reason == "revert: zombie exists"
    ));
}

#[test]
fn test_failure_reason_forms() {
    assert_eq!(failure_reason(&execution_error("boom")), "boom");
    assert_eq!(failure_reason(&json!("plain")), "plain");
    assert_eq!(
        failure_reason(&json!({"InvalidTxError": {"InvalidNonce": {"tx_nonce": 1}}})),
        r#"{"InvalidTxError":{"InvalidNonce":{"tx_nonce":1}}}"#
    );
}

#[test]
fn test_unknown_status_is_rejected() {
    let view = OutcomeBuilder::new(1).receipt(ExecutionStatusView::Unknown, 1).build();
    assert!(matches!(ExecutionOutcome::from_view(view), Err(BridgeError::InvalidResponse(_))));
}

#[test]
fn test_invalid_base64_is_rejected() {
    let view = OutcomeBuilder::new(1)
        .receipt(ExecutionStatusView::SuccessValue("not base64!".to_string()), 1)
        .build();
    assert!(matches!(ExecutionOutcome::try_from(view), Err(BridgeError::InvalidResponse(_))));
}

#[test]
fn test_builder_receipt_ids_stay_unique() {
    let builder = (0..300).fold(OutcomeBuilder::new(1), |builder, _| {
        builder.receipt(success_value(&[]), 1)
    });
    let outcome = ExecutionOutcome::from_view(builder.build()).unwrap();

    assert_eq!(outcome.iter().count(), 301);
    assert_eq!(outcome.receipts[0].receipts.len(), 299);
    assert_ne!(OutcomeBuilder::receipt_id(0), OutcomeBuilder::receipt_id(256));
}
