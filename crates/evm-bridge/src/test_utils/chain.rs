use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use super::OutcomeBuilder;
use crate::{
    rpc::{
        AccessKeyView, AccountView, CallFunctionView, FinalExecutionOutcomeView,
        FinalExecutionStatusView, NativeRpc,
    },
    wire::Action,
    AccountId, BridgeError, CryptoHash, PublicKey, Result, SignedTransaction,
};

/// A function call received by a [`MockChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCall {
    /// Contract the call was made to
    pub contract_id: AccountId,
    /// Function name
    pub method_name: String,
    /// Raw arguments
    pub args: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    block_hash: CryptoHash,
    nonces: HashMap<(AccountId, PublicKey), u64>,
    balances: HashMap<AccountId, u128>,
    view_results: HashMap<String, Vec<u8>>,
    outcomes: VecDeque<FinalExecutionOutcomeView>,
    submitted: Vec<SignedTransaction>,
    statuses: HashMap<CryptoHash, (u32, FinalExecutionOutcomeView)>,
    calls: Vec<ReceivedCall>,
}

/// An in-memory native chain.
///
/// Submitted transactions are checked like the chain would: the signature must verify and
/// the nonce must be exactly one above the access key's. Each submission consumes the next
/// scripted outcome, or succeeds with an empty value if none is left.
#[derive(Debug, Default)]
pub struct MockChain {
    state: Mutex<MockState>,
    commit_delay: Option<Duration>,
    pending_polls: u32,
}

impl MockChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Delays every `broadcast_tx_commit` by `delay`.
    pub const fn commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// Reports asynchronously broadcast transactions as started for `polls` status queries
    /// before they become final.
    pub const fn pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Sets the block hash reported with access keys.
    pub fn block_hash(self, block_hash: CryptoHash) -> Self {
        self.state().block_hash = block_hash;
        self
    }

    /// Queues the outcome of the next submission.
    pub fn push_outcome(&self, outcome: FinalExecutionOutcomeView) {
        self.state().outcomes.push_back(outcome);
    }

    /// Queues the outcome of the next submission.
    pub fn outcome(self, outcome: FinalExecutionOutcomeView) -> Self {
        self.push_outcome(outcome);
        self
    }

    /// Sets the nonce of an access key.
    pub fn set_nonce(&self, account_id: AccountId, public_key: PublicKey, nonce: u64) {
        self.state().nonces.insert((account_id, public_key), nonce);
    }

    /// The nonce of an access key.
    pub fn nonce(&self, account_id: &AccountId, public_key: &PublicKey) -> u64 {
        self.state().nonces.get(&(account_id.clone(), *public_key)).copied().unwrap_or_default()
    }

    /// Sets the balance of an account.
    pub fn set_balance(&self, account_id: AccountId, balance: u128) {
        self.state().balances.insert(account_id, balance);
    }

    /// Sets the result of read-only calls of `method_name`.
    pub fn set_view_result(&self, method_name: impl Into<String>, result: impl Into<Vec<u8>>) {
        self.state().view_results.insert(method_name.into(), result.into());
    }

    /// Stores the outcome reported by status queries of `tx_hash`.
    pub fn set_status(&self, tx_hash: CryptoHash, outcome: FinalExecutionOutcomeView) {
        self.state().statuses.insert(tx_hash, (0, outcome));
    }

    /// All accepted transactions, in submission order.
    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.state().submitted.clone()
    }

    /// All read-only calls, in call order.
    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.state().calls.clone()
    }

    fn accept(&self, tx: &SignedTransaction) -> Result<FinalExecutionOutcomeView> {
        if !tx.verify() {
            return Err(BridgeError::InvalidResponse("invalid signature".to_string()));
        }

        let inner = &tx.transaction;
        let signer: AccountId = inner.signer_id.parse()?;
        let public_key = PublicKey::from(inner.public_key);

        let mut state = self.state();
        let nonce = state.nonces.entry((signer, public_key)).or_default();
        if inner.nonce != *nonce + 1 {
            return Err(BridgeError::InvalidResponse(format!(
                "invalid nonce {}, expected {}",
                inner.nonce,
                *nonce + 1
            )));
        }
        *nonce = inner.nonce;
        state.submitted.push(tx.clone());

        let mut outcome = state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| OutcomeBuilder::default().receipt(super::success_value(&[]), 0).build());
        outcome.transaction_outcome.id = tx.hash();
        Ok(outcome)
    }
}

impl NativeRpc for MockChain {
    async fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyView> {
        let state = self.state();
        let nonce =
            state.nonces.get(&(account_id.clone(), *public_key)).copied().unwrap_or_default();
        Ok(AccessKeyView { nonce, block_hash: state.block_hash })
    }

    async fn view_account(&self, account_id: &AccountId) -> Result<AccountView> {
        let state = self.state();
        let amount = state.balances.get(account_id).copied().ok_or_else(|| {
            BridgeError::InvalidResponse(format!("account {account_id} does not exist"))
        })?;
        Ok(AccountView { amount, code_hash: CryptoHash::ZERO, storage_usage: 0, block_hash: state.block_hash })
    }

    async fn call_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &[u8],
    ) -> Result<CallFunctionView> {
        let mut state = self.state();
        state.calls.push(ReceivedCall {
            contract_id: contract_id.clone(),
            method_name: method_name.to_string(),
            args: args.to_vec(),
        });
        let result = state.view_results.get(method_name).cloned().unwrap_or_default();
        Ok(CallFunctionView { result, logs: Vec::new() })
    }

    async fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<FinalExecutionOutcomeView> {
        let outcome = self.accept(tx)?;
        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(outcome)
    }

    async fn broadcast_tx_async(&self, tx: &SignedTransaction) -> Result<CryptoHash> {
        let outcome = self.accept(tx)?;
        self.state().statuses.insert(tx.hash(), (self.pending_polls, outcome));
        Ok(tx.hash())
    }

    async fn tx_status(
        &self,
        tx_hash: CryptoHash,
        _sender: &AccountId,
    ) -> Result<Option<FinalExecutionOutcomeView>> {
        let mut state = self.state();
        let Some((pending, outcome)) = state.statuses.get_mut(&tx_hash) else {
            return Ok(None);
        };
        if *pending > 0 {
            *pending -= 1;
            let mut started = outcome.clone();
            started.status = FinalExecutionStatusView::Started;
            return Ok(Some(started));
        }
        Ok(Some(outcome.clone()))
    }
}

/// The function calls of a transaction.
pub fn function_calls(tx: &SignedTransaction) -> Vec<(&str, &[u8])> {
    tx.transaction
        .actions
        .iter()
        .filter_map(|action| match action {
            Action::FunctionCall(call) => Some((call.method_name.as_str(), call.args.as_slice())),
            _ => None,
        })
        .collect()
}
