//! Tests for signing, submitting and tracking transactions.

use std::time::Duration;

use alloy_primitives::Bytes;
use evm_bridge::{
    constants::TGAS,
    test_utils::{
        failure_outcome, function_calls, success_outcome, success_value, MockChain, OutcomeBuilder,
    },
    AccountId, BridgeError, CryptoHash, InMemoryKeySource, MergeKeySource, NativeTransaction, SigningKey,
    SubmitConfig, SubmitMode, Submitter,
};
use tokio::time::Instant;

fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

fn keys(accounts: &[&str]) -> MergeKeySource {
    let source = InMemoryKeySource::new();
    for id in accounts {
        source.insert(account(id), SigningKey::from_seed(id));
    }
    MergeKeySource::default().with_source(source)
}

fn call(signer: &str) -> NativeTransaction {
    NativeTransaction {
        signer: account(signer),
        receiver: account("evm"),
        function_name: "call_contract".to_string(),
        args: Bytes::from_static(b"{}"),
        gas: 300 * TGAS,
        deposit: 0,
    }
}

fn submitter(chain: MockChain, config: SubmitConfig) -> Submitter<MockChain> {
    Submitter::new(chain, keys(&["alice", "bob"]), config)
}

#[tokio::test]
async fn test_successful_submission() {
    let chain = MockChain::new()
        .block_hash(CryptoHash::repeat_byte(7))
        .outcome(success_outcome(b"zombie", 2_400_000_000_000, 300_000_000_000));
    let submitter = submitter(chain, SubmitConfig::default());

    let submission = submitter.submit(call("alice")).await.unwrap();
    assert_eq!(submission.return_value(), Bytes::from_static(b"zombie"));
    assert_eq!(submission.gas().get(), 2_700_000_000_000);
    assert_eq!(submission.outcome.id, submission.tx_hash);

    let submitted = submitter.chain().submitted();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0];
    assert!(tx.verify());
    assert_eq!(tx.hash(), submission.tx_hash);
    assert_eq!(tx.transaction.nonce, 1);
    assert_eq!(tx.transaction.block_hash, CryptoHash::repeat_byte(7));
    assert_eq!(function_calls(tx), [("call_contract", b"{}".as_slice())]);

    let output = submission.into_result().unwrap();
    assert_eq!(output.return_value, Bytes::from_static(b"zombie"));
}

#[tokio::test]
async fn test_revert_reason_is_surfaced_verbatim() {
    let chain = MockChain::new().outcome(failure_outcome("revert: zombie exists", TGAS, TGAS));
    let submitter = submitter(chain, SubmitConfig::default());

    let err = submitter.submit(call("alice")).await.unwrap_err();
    assert!(
        matches!(&err, BridgeError::ExecutionReverted(reason) if reason == "revert: zombie exists"),
        "unexpected error: {err}"
    );
    assert!(!err.is_indeterminate());
}

#[tokio::test]
async fn test_missing_key_fails_before_submission() {
    let submitter = submitter(MockChain::new(), SubmitConfig::default());

    let err = submitter.submit(call("carol")).await.unwrap_err();
    assert!(matches!(err, BridgeError::KeyNotFound { account_id } if account_id.as_str() == "carol"));
    assert!(submitter.chain().submitted().is_empty());
}

#[tokio::test]
async fn test_nonce_follows_access_key() {
    let alice = account("alice");
    let public_key = SigningKey::from_seed("alice").public_key();
    let chain = MockChain::new();
    chain.set_nonce(alice.clone(), public_key, 41);
    let submitter = submitter(chain, SubmitConfig::default());

    submitter.submit(call("alice")).await.unwrap();
    submitter.submit(call("alice")).await.unwrap();

    let nonces: Vec<u64> =
        submitter.chain().submitted().iter().map(|tx| tx.transaction.nonce).collect();
    assert_eq!(nonces, [42, 43]);
    assert_eq!(submitter.chain().nonce(&alice, &public_key), 43);
}

#[tokio::test(start_paused = true)]
async fn test_same_signer_is_serialized() {
    let chain = MockChain::new().commit_delay(Duration::from_secs(1));
    let submitter = submitter(chain, SubmitConfig::default());

    let start = Instant::now();
    let (first, second) = tokio::join!(submitter.submit(call("alice")), submitter.submit(call("alice")));
    first.unwrap();
    second.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(2));
    let nonces: Vec<u64> =
        submitter.chain().submitted().iter().map(|tx| tx.transaction.nonce).collect();
    assert_eq!(nonces, [1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_different_signers_run_concurrently() {
    let chain = MockChain::new().commit_delay(Duration::from_secs(1));
    let submitter = submitter(chain, SubmitConfig::default());

    let start = Instant::now();
    let (first, second) = tokio::join!(submitter.submit(call("alice")), submitter.submit(call("bob")));
    first.unwrap();
    second.unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_commit_timeout() {
    let chain = MockChain::new().commit_delay(Duration::from_secs(120));
    let config = SubmitConfig { timeout: Duration::from_secs(60), ..Default::default() };
    let submitter = submitter(chain, config);

    let err = submitter.submit(call("alice")).await.unwrap_err();
    let BridgeError::SubmissionTimeout { tx_hash } = &err else {
        panic!("expected a timeout, got {err}");
    };
    let tx_hash = *tx_hash;
    assert_eq!(tx_hash, submitter.chain().submitted()[0].hash());

    // The outcome can still be retrieved later.
    let outcome = success_outcome(b"late", TGAS, TGAS);
    submitter.chain().set_status(tx_hash, outcome);
    let outcome = submitter.tracker().status(tx_hash, &account("alice")).await.unwrap().unwrap();
    assert_eq!(outcome.last_result(), Some(&Bytes::from_static(b"late")));
}

#[tokio::test(start_paused = true)]
async fn test_async_mode_polls_until_final() {
    let chain = MockChain::new()
        .pending_polls(3)
        .outcome(OutcomeBuilder::new(TGAS).receipt(success_value(b"ok"), TGAS).build());
    let config = SubmitConfig { mode: SubmitMode::Async, ..Default::default() };
    let submitter = submitter(chain, config);

    let start = Instant::now();
    let submission = submitter.submit(call("alice")).await.unwrap();
    assert_eq!(submission.return_value(), Bytes::from_static(b"ok"));
    assert!(start.elapsed() >= config.poll_interval * 3);
}

#[tokio::test(start_paused = true)]
async fn test_async_mode_times_out() {
    let chain = MockChain::new().pending_polls(u32::MAX);
    let config = SubmitConfig {
        mode: SubmitMode::Async,
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let submitter = submitter(chain, config);

    let err = submitter.submit(call("alice")).await.unwrap_err();
    assert!(err.is_indeterminate());
}

#[tokio::test(start_paused = true)]
async fn test_async_mode_waits_out_a_timeout_shorter_than_the_poll_interval() {
    let chain = MockChain::new().pending_polls(u32::MAX);
    let config = SubmitConfig {
        mode: SubmitMode::Async,
        timeout: Duration::from_secs(4),
        poll_interval: Duration::from_secs(5),
    };
    let submitter = submitter(chain, config);

    let start = Instant::now();
    let err = submitter.submit(call("alice")).await.unwrap_err();
    assert!(err.is_indeterminate());
    assert!(start.elapsed() >= Duration::from_secs(4));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_async_mode_polls_once_more_at_the_deadline() {
    let chain = MockChain::new().pending_polls(1).outcome(success_outcome(b"late", TGAS, TGAS));
    let config = SubmitConfig {
        mode: SubmitMode::Async,
        timeout: Duration::from_secs(4),
        poll_interval: Duration::from_secs(5),
    };
    let submitter = submitter(chain, config);

    let submission = submitter.submit(call("alice")).await.unwrap();
    assert_eq!(submission.return_value(), Bytes::from_static(b"late"));
}

#[tokio::test]
async fn test_unknown_transaction_has_no_status() {
    let submitter = submitter(MockChain::new(), SubmitConfig::default());
    let status = submitter.tracker().status(CryptoHash::repeat_byte(1), &account("alice")).await.unwrap();
    assert!(status.is_none());
}
