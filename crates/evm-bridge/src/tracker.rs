//! Retrieval of transaction outcomes after submission.

use std::time::Duration;

use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, trace, warn};

use crate::{
    rpc::{FinalExecutionOutcomeView, FinalExecutionStatusView, NativeRpc},
    AccountId, BridgeError, CryptoHash, ExecutionOutcome, Result,
};

/// Default interval between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Queries the status of submitted transactions.
#[derive(Debug)]
pub struct Tracker<'a, C> {
    chain: &'a C,
    poll_interval: Duration,
}

impl<'a, C: NativeRpc> Tracker<'a, C> {
    /// Creates a tracker polling `chain` every `poll_interval`.
    pub const fn new(chain: &'a C, poll_interval: Duration) -> Self {
        Self { chain, poll_interval }
    }

    /// The final outcome of `tx_hash`, or `None` if the chain has not finished it yet.
    pub async fn status(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
    ) -> Result<Option<ExecutionOutcome>> {
        match self.chain.tx_status(tx_hash, sender).await? {
            Some(view) if is_final(&view) => Ok(Some(ExecutionOutcome::from_view(view)?)),
            Some(_) => {
                trace!(%tx_hash, "Transaction not final yet");
                Ok(None)
            }
            None => {
                trace!(%tx_hash, "Transaction unknown");
                Ok(None)
            }
        }
    }

    /// Polls until `tx_hash` is final or `timeout` elapses.
    pub async fn wait_for(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
        timeout: Duration,
    ) -> Result<ExecutionOutcome> {
        self.wait_until(tx_hash, sender, Instant::now() + timeout).await
    }

    /// Polls until `tx_hash` is final or `deadline` passes.
    ///
    /// A node-side timeout of a single query is treated like "not final yet". The last query
    /// is made at the deadline, even if that is closer than a full poll interval.
    pub async fn wait_until(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
        deadline: Instant,
    ) -> Result<ExecutionOutcome> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match timeout_at(deadline, self.status(tx_hash, sender)).await {
                Ok(Ok(Some(outcome))) => {
                    debug!(%tx_hash, attempts, "Transaction final");
                    return Ok(outcome);
                }
                Ok(Ok(None) | Err(BridgeError::SubmissionTimeout { .. })) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep_until((now + self.poll_interval).min(deadline)).await;
        }

        warn!(%tx_hash, attempts, "Gave up waiting for transaction outcome");
        Err(BridgeError::SubmissionTimeout { tx_hash })
    }
}

/// Whether the overall status is terminal.
pub fn is_final(view: &FinalExecutionOutcomeView) -> bool {
    matches!(
        view.status,
        FinalExecutionStatusView::SuccessValue(_) | FinalExecutionStatusView::Failure(_)
    )
}
