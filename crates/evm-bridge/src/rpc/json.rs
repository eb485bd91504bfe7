use core::fmt;

use alloy_rpc_client::RpcClient;
use alloy_transport::TransportError;
use alloy_transport_http::Http;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, trace};

use super::{AccessKeyView, AccountView, CallFunctionView, FinalExecutionOutcomeView, NativeRpc};
use crate::{AccountId, BridgeError, CryptoHash, PublicKey, Result, SignedTransaction};

/// Finality requested for queries.
const FINALITY: &str = "final";

/// [`NativeRpc`] over the node's JSON-RPC 2.0 HTTP endpoint.
#[derive(Clone)]
pub struct JsonRpcChain {
    url: Url,
    client: RpcClient,
}

impl fmt::Debug for JsonRpcChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcChain").field("url", &self.url.as_str()).finish_non_exhaustive()
    }
}

impl JsonRpcChain {
    /// Creates a client for the node at `url`.
    pub fn new(url: Url) -> Self {
        let is_local = url.host_str().is_some_and(|host| host == "localhost" || host == "127.0.0.1");
        let transport = Http::new(url.clone());
        Self { client: RpcClient::new(transport, is_local), url }
    }

    /// Parses `node_url` and creates a client for it.
    pub fn connect(node_url: &str) -> Result<Self> {
        let url = node_url
            .parse()
            .map_err(|e| BridgeError::InvalidConfig(format!("Invalid node URL '{node_url}': {e}")))?;
        Ok(Self::new(url))
    }

    /// The node URL.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn request<P, R>(&self, method: &'static str, params: P) -> Result<R, TransportError>
    where
        P: serde::Serialize + Clone + fmt::Debug + Send + Sync + Unpin,
        R: DeserializeOwned + fmt::Debug + Send + Sync + Unpin + 'static,
    {
        trace!(method, ?params, "RPC request");
        self.client.request(method, params).await
    }

    async fn query<R>(&self, request: serde_json::Value) -> Result<R>
    where
        R: DeserializeOwned + fmt::Debug + Send + Sync + Unpin + 'static,
    {
        Ok(self.request("query", request).await?)
    }
}

/// Text of an error response: message and data, if any.
fn error_text(error: &TransportError) -> Option<String> {
    let payload = error.as_error_resp()?;
    let data = payload.data.as_ref().map(|data| data.get()).unwrap_or_default();
    Some(format!("{} {data}", payload.message))
}

/// Whether the node gave up waiting for the transaction's outcome.
fn is_timeout(error: &TransportError) -> bool {
    error_text(error).is_some_and(|text| text.to_ascii_lowercase().contains("timeout"))
}

/// Whether the node doesn't know the queried transaction.
fn is_unknown_transaction(error: &TransportError) -> bool {
    error_text(error).is_some_and(|text| {
        text.contains("UNKNOWN_TRANSACTION") || text.contains("doesn't exist")
    })
}

impl NativeRpc for JsonRpcChain {
    async fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyView> {
        self.query(json!({
            "request_type": "view_access_key",
            "finality": FINALITY,
            "account_id": account_id,
            "public_key": public_key,
        }))
        .await
    }

    async fn view_account(&self, account_id: &AccountId) -> Result<AccountView> {
        self.query(json!({
            "request_type": "view_account",
            "finality": FINALITY,
            "account_id": account_id,
        }))
        .await
    }

    async fn call_function(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &[u8],
    ) -> Result<CallFunctionView> {
        self.query(json!({
            "request_type": "call_function",
            "finality": FINALITY,
            "account_id": contract_id,
            "method_name": method_name,
            "args_base64": STANDARD.encode(args),
        }))
        .await
    }

    async fn broadcast_tx_commit(&self, tx: &SignedTransaction) -> Result<FinalExecutionOutcomeView> {
        let encoded = tx.to_base64()?;
        debug!(tx_hash = %tx.hash(), "broadcast_tx_commit");
        self.request("broadcast_tx_commit", vec![encoded]).await.map_err(|e| {
            if is_timeout(&e) {
                BridgeError::SubmissionTimeout { tx_hash: tx.hash() }
            } else {
                e.into()
            }
        })
    }

    async fn broadcast_tx_async(&self, tx: &SignedTransaction) -> Result<CryptoHash> {
        let encoded = tx.to_base64()?;
        debug!(tx_hash = %tx.hash(), "broadcast_tx_async");
        let tx_hash: CryptoHash = self.request("broadcast_tx_async", vec![encoded]).await?;
        if tx_hash != tx.hash() {
            return Err(BridgeError::InvalidResponse(format!(
                "node reported hash {tx_hash}, expected {}",
                tx.hash()
            )));
        }
        Ok(tx_hash)
    }

    async fn tx_status(
        &self,
        tx_hash: CryptoHash,
        sender: &AccountId,
    ) -> Result<Option<FinalExecutionOutcomeView>> {
        match self.request("tx", (tx_hash.to_string(), sender.to_string())).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) if is_unknown_transaction(&e) => Ok(None),
            Err(e) if is_timeout(&e) => Err(BridgeError::SubmissionTimeout { tx_hash }),
            Err(e) => Err(e.into()),
        }
    }
}
