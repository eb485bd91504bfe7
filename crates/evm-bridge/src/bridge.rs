//! The EVM-facing entry point of the crate.

use std::path::Path;

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use tracing::{debug, info};

use crate::{
    constants::methods,
    rpc::{JsonRpcChain, NativeRpc},
    wire::{Action, DeployContractAction},
    Account, AccountId, BridgeConfig, BridgeError, CallOutput, CryptoHash, EvmCall,
    ExecutionOutcome, Gas, GetStorageAtArgs, MergeKeySource, Result, Submission, Submitter,
    Translator,
};

/// A deployed EVM contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the new contract
    pub address: Address,
    /// Gas burnt by the deployment
    pub gas: Gas,
    /// Transaction hash
    pub tx_hash: CryptoHash,
}

/// Runs EVM operations as transactions against the EVM contract of a native chain.
///
/// Deployments are signed by the configured default signer. Calls name their signer
/// explicitly, the EVM contract sees the signer's [EVM address](AccountId::evm_address) as
/// the caller.
#[derive(Debug)]
pub struct EvmBridge<C> {
    config: BridgeConfig,
    translator: Translator,
    submitter: Submitter<C>,
}

impl EvmBridge<JsonRpcChain> {
    /// Connects to the node of `config`, signing with keys from `keys`.
    pub fn connect(config: BridgeConfig, keys: MergeKeySource) -> Result<Self> {
        let chain = JsonRpcChain::connect(&config.node_url)?;
        Ok(Self::new(chain, keys, config))
    }
}

impl<C: NativeRpc> EvmBridge<C> {
    /// Creates a bridge over `chain`, resolving signing keys from `keys`.
    pub fn new(chain: C, keys: MergeKeySource, config: BridgeConfig) -> Self {
        let submitter = Submitter::new(chain, keys, config.submit_config());
        Self { translator: Translator::new(config.translator), config, submitter }
    }

    /// The settings.
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The submitter.
    pub const fn submitter(&self) -> &Submitter<C> {
        &self.submitter
    }

    /// The chain client.
    pub const fn chain(&self) -> &C {
        self.submitter.chain()
    }

    /// Deploys the hex-encoded bytecode in the file at `path`.
    pub async fn deploy_contract(&self, path: impl AsRef<Path>) -> Result<Deployment> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let bytecode = hex::decode(content.trim()).map_err(|e| {
            BridgeError::InvalidConfig(format!("Invalid bytecode in {}: {e}", path.display()))
        })?;
        self.deploy_code(bytecode.into()).await
    }

    /// Deploys `bytecode` and returns the address the EVM assigned to it.
    pub async fn deploy_code(&self, bytecode: Bytes) -> Result<Deployment> {
        let signer = self.config.signer()?;
        let call = EvmCall::deploy_code(self.config.evm_contract.clone(), bytecode);
        let submission = self.send(call, signer).await?;

        let output = submission.return_value();
        let address = parse_address(&output).ok_or_else(|| {
            BridgeError::InvalidResponse(format!("deploy_code returned no address: {output}"))
        })?;
        let deployment = Deployment { address, gas: submission.gas(), tx_hash: submission.tx_hash };
        info!(%address, gas = %deployment.gas, "Deployed contract");
        Ok(deployment)
    }

    /// Calls `contract` with ABI-encoded `input`, transferring `value`, signed by `from`.
    pub async fn call_contract(
        &self,
        contract: Address,
        input: Bytes,
        value: U256,
        from: &AccountId,
    ) -> Result<CallOutput> {
        let call =
            EvmCall::call_contract(self.config.evm_contract.clone(), contract, input, value);
        let mut output = self.send(call, from).await?.into_result()?;
        output.return_value = decode_output(output.return_value);
        Ok(output)
    }

    /// Runs a read-only call of `contract` as `from`. Nothing is signed or submitted.
    pub async fn view_call(&self, contract: Address, input: Bytes, from: &AccountId) -> Result<Bytes> {
        let call = EvmCall::view_call(self.config.evm_contract.clone(), contract, input);
        let tx = self.translator.translate(call, &Account::new(from.clone()))?;
        let view = self.chain().call_function(&tx.receiver, &tx.function_name, &tx.args).await?;
        debug!(%contract, len = view.result.len(), "View call returned");
        Ok(decode_output(view.result.into()))
    }

    /// The native account and its balance.
    pub async fn view_account(&self, account_id: &AccountId) -> Result<Account> {
        let view = self.chain().view_account(account_id).await?;
        Ok(Account { id: account_id.clone(), balance: Some(view.amount) })
    }

    /// The outcome of an earlier submission, `None` while it is not final.
    pub async fn status(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
    ) -> Result<Option<ExecutionOutcome>> {
        self.submitter.tracker().status(tx_hash, sender).await
    }

    /// The EVM address of a native account.
    pub fn evm_address(&self, account_id: &AccountId) -> Address {
        account_id.evm_address()
    }

    /// The deployed code at `address`.
    pub async fn evm_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.evm_state(methods::GET_CODE, address).await?.into())
    }

    /// The EVM balance of `address`.
    pub async fn evm_balance(&self, address: Address) -> Result<U256> {
        self.evm_word(methods::GET_BALANCE, address).await
    }

    /// The EVM nonce of `address`.
    pub async fn evm_nonce(&self, address: Address) -> Result<U256> {
        self.evm_word(methods::GET_NONCE, address).await
    }

    /// The value of storage slot `key` of `address`.
    pub async fn evm_storage_at(&self, address: Address, key: B256) -> Result<B256> {
        let args = borsh::to_vec(&GetStorageAtArgs::new(address, key))?;
        let view = self
            .chain()
            .call_function(&self.config.evm_contract, methods::GET_STORAGE_AT, &args)
            .await?;
        B256::try_from(view.result.as_slice()).map_err(|_| {
            BridgeError::InvalidResponse(format!(
                "{} returned {} bytes",
                methods::GET_STORAGE_AT,
                view.result.len()
            ))
        })
    }

    /// Deploys the EVM contract itself: `wasm` is installed on the configured EVM contract
    /// account, signed with that account's own key.
    pub async fn install_evm(&self, wasm: Bytes) -> Result<Submission> {
        let account = &self.config.evm_contract;
        let action = Action::DeployContract(DeployContractAction { code: wasm.to_vec() });
        let submission = self.submitter.submit_actions(account, account, vec![action]).await?;
        info!(%account, gas = %submission.gas(), "Installed EVM contract");
        Ok(submission)
    }

    async fn send(&self, call: EvmCall, signer: &AccountId) -> Result<Submission> {
        let tx = self.translator.translate(call, &Account::new(signer.clone()))?;
        debug!(%signer, function = %tx.function_name, args_len = tx.args.len(), "Sending EVM call");
        self.submitter.submit(tx).await
    }

    async fn evm_state(&self, method: &str, address: Address) -> Result<Vec<u8>> {
        let view =
            self.chain().call_function(&self.config.evm_contract, method, address.as_slice()).await?;
        Ok(view.result)
    }

    async fn evm_word(&self, method: &str, address: Address) -> Result<U256> {
        let word = self.evm_state(method, address).await?;
        U256::try_from_be_slice(&word).ok_or_else(|| {
            BridgeError::InvalidResponse(format!("{method} returned {} bytes", word.len()))
        })
    }
}

/// Unwraps an EVM output that the contract returned as a JSON string of hex. Other outputs are
/// returned unchanged.
pub fn decode_output(output: Bytes) -> Bytes {
    match serde_json::from_slice::<String>(&output) {
        Ok(text) => hex::decode(&text).map(Bytes::from).unwrap_or(output),
        Err(_) => output,
    }
}

/// Parses a contract address returned by `deploy_code`: 20 raw bytes, bare hex text, or a JSON
/// string of hex.
pub fn parse_address(output: &[u8]) -> Option<Address> {
    if output.len() == 20 {
        return Some(Address::from_slice(output));
    }
    let text = core::str::from_utf8(output).ok()?.trim();
    let text = serde_json::from_str::<String>(text).unwrap_or_else(|_| text.to_string());
    text.parse().ok()
}
