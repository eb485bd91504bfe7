//! Signing and submission of native transactions.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use alloy_primitives::Bytes;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::{
    extract_gas,
    rpc::NativeRpc,
    tracker::{Tracker, DEFAULT_POLL_INTERVAL},
    wire::{Action, Transaction},
    AccountId, BridgeError, CryptoHash, ExecutionOutcome, Gas, MergeKeySource, NativeTransaction,
    Result,
};

/// Default time to wait for a final outcome.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// How a transaction is handed to the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitMode {
    /// Single round trip that returns once the outcome is final
    #[default]
    Commit,
    /// Broadcast without waiting, then poll the status
    Async,
}

/// Submission settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Time to wait for a final outcome after signing
    pub timeout: Duration,
    /// Interval between status queries
    pub poll_interval: Duration,
    /// Broadcast mode
    pub mode: SubmitMode,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SUBMIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            mode: SubmitMode::default(),
        }
    }
}

/// A successfully executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Transaction hash
    pub tx_hash: CryptoHash,
    /// Final outcome, free of failures
    pub outcome: ExecutionOutcome,
}

impl Submission {
    /// Total gas burnt.
    pub fn gas(&self) -> Gas {
        extract_gas(&self.outcome)
    }

    /// The EVM-level return value, empty if the call returned nothing.
    pub fn return_value(&self) -> Bytes {
        self.outcome.last_result().cloned().unwrap_or_default()
    }

    /// The call output, or [`BridgeError::ExecutionReverted`] with the chain's reason if any
    /// receipt failed.
    pub fn into_result(self) -> Result<CallOutput> {
        if let Some(reason) = self.outcome.first_failure() {
            return Err(BridgeError::ExecutionReverted(reason.to_string()));
        }
        Ok(self.into())
    }
}

/// Return value and gas of an EVM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutput {
    /// Transaction hash
    pub tx_hash: CryptoHash,
    /// The EVM-level return value
    pub return_value: Bytes,
    /// Total gas burnt
    pub gas: Gas,
}

impl From<Submission> for CallOutput {
    fn from(submission: Submission) -> Self {
        Self { tx_hash: submission.tx_hash, return_value: submission.return_value(), gas: submission.gas() }
    }
}

/// Signs transactions with keys from a [`MergeKeySource`] and submits them to the chain.
///
/// Submissions of the same signer are serialized so nonces are used in order. Submissions of
/// different signers run concurrently. Nothing is retried.
#[derive(Debug)]
pub struct Submitter<C> {
    chain: C,
    keys: MergeKeySource,
    config: SubmitConfig,
    locks: Mutex<HashMap<AccountId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<C: NativeRpc> Submitter<C> {
    /// Creates a submitter.
    pub fn new(chain: C, keys: MergeKeySource, config: SubmitConfig) -> Self {
        Self { chain, keys, config, locks: Mutex::default() }
    }

    /// The chain client.
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// The key resolver.
    pub const fn keys(&self) -> &MergeKeySource {
        &self.keys
    }

    /// Submission settings.
    pub const fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// A tracker for already submitted transactions.
    pub const fn tracker(&self) -> Tracker<'_, C> {
        Tracker::new(&self.chain, self.config.poll_interval)
    }

    /// Signs and submits `tx`, then waits for its final outcome.
    ///
    /// Fails with [`BridgeError::ExecutionReverted`] if any receipt failed and with
    /// [`BridgeError::SubmissionTimeout`] if no final outcome arrived in time.
    pub async fn submit(&self, tx: NativeTransaction) -> Result<Submission> {
        let signer = tx.signer.clone();
        let receiver = tx.receiver.clone();
        self.submit_actions(&signer, &receiver, vec![tx.into()]).await
    }

    /// Signs and submits a transaction made of arbitrary `actions`.
    pub async fn submit_actions(
        &self,
        signer: &AccountId,
        receiver: &AccountId,
        actions: Vec<Action>,
    ) -> Result<Submission> {
        let key = self.keys.resolve(signer)?;
        let public_key = key.public_key();

        let lock = self.account_lock(signer);
        let guard = lock.lock().await;

        let access_key = self.chain.view_access_key(signer, &public_key).await?;
        let nonce = access_key.nonce + 1;
        let signed = Transaction {
            signer_id: signer.to_string(),
            public_key: public_key.into(),
            nonce,
            receiver_id: receiver.to_string(),
            block_hash: access_key.block_hash,
            actions,
        }
        .sign(&key)?;
        let tx_hash = signed.hash();
        debug!(%signer, %receiver, nonce, %tx_hash, "Signed transaction");

        let deadline = Instant::now() + self.config.timeout;
        let timed_out = || {
            warn!(%tx_hash, timeout = ?self.config.timeout, "No final outcome in time");
            BridgeError::SubmissionTimeout { tx_hash }
        };
        let view = match self.config.mode {
            SubmitMode::Commit => {
                let sent = timeout_at(deadline, self.chain.broadcast_tx_commit(&signed)).await;
                drop(guard);
                sent.map_err(|_| timed_out())??
            }
            SubmitMode::Async => {
                timeout_at(deadline, self.chain.broadcast_tx_async(&signed))
                    .await
                    .map_err(|_| timed_out())??;
                drop(guard);
                let outcome = self.tracker().wait_until(tx_hash, signer, deadline).await?;
                return self.finish(tx_hash, outcome);
            }
        };

        self.finish(tx_hash, ExecutionOutcome::from_view(view)?)
    }

    fn finish(&self, tx_hash: CryptoHash, outcome: ExecutionOutcome) -> Result<Submission> {
        let gas = extract_gas(&outcome);
        if let Some(reason) = outcome.first_failure() {
            warn!(%tx_hash, %gas, reason, "Transaction reverted");
            return Err(BridgeError::ExecutionReverted(reason.to_string()));
        }
        info!(%tx_hash, gas_burnt = gas.get(), "Transaction executed");
        Ok(Submission { tx_hash, outcome })
    }

    fn account_lock(&self, account_id: &AccountId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(account_id.clone()).or_default().clone()
    }
}
