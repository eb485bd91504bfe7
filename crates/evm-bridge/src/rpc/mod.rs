//! Access to the native chain.

use core::{fmt::Debug, future::Future};

use crate::{AccountId, CryptoHash, PublicKey, Result, SignedTransaction};

mod json;
pub use json::*;

mod views;
pub use views::*;

/// The RPC surface of the native chain the bridge needs.
///
/// Read-style calls may be issued concurrently. Transaction submission must be serialized per
/// signing account by the caller, see [`crate::Submitter`].
pub trait NativeRpc: Debug + Send + Sync {
    /// Returns the current nonce of an access key and a recent block hash.
    fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> impl Future<Output = Result<AccessKeyView>> + Send;

    /// Returns the state of an account.
    fn view_account(&self, account_id: &AccountId) -> impl Future<Output = Result<AccountView>> + Send;

    /// Runs a read-only function of a contract.
    fn call_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &[u8],
    ) -> impl Future<Output = Result<CallFunctionView>> + Send;

    /// Submits a transaction and waits for its final outcome.
    fn broadcast_tx_commit(
        &self,
        tx: &SignedTransaction,
    ) -> impl Future<Output = Result<FinalExecutionOutcomeView>> + Send;

    /// Submits a transaction without waiting, returns its hash.
    fn broadcast_tx_async(&self, tx: &SignedTransaction) -> impl Future<Output = Result<CryptoHash>> + Send;

    /// Queries the outcome of a submitted transaction. `None` if the chain doesn't know the
    /// transaction (yet).
    fn tx_status(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
    ) -> impl Future<Output = Result<Option<FinalExecutionOutcomeView>>> + Send;
}
