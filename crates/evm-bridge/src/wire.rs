//! Binary transaction format of the native chain.
//!
//! Transactions are borsh-encoded. The transaction hash is `sha256` over the encoded
//! [`Transaction`], and the signature is an ed25519 signature over that hash.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::{
    keys::Signature, BridgeError, CryptoHash, NativeTransaction, PublicKey, Result, SigningKey,
};

/// Public key as encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum WirePublicKey {
    /// ed25519 key
    Ed25519([u8; 32]),
}

impl From<PublicKey> for WirePublicKey {
    fn from(key: PublicKey) -> Self {
        Self::Ed25519(*key.as_bytes())
    }
}

impl From<WirePublicKey> for PublicKey {
    fn from(key: WirePublicKey) -> Self {
        match key {
            WirePublicKey::Ed25519(bytes) => Self::from_bytes(bytes),
        }
    }
}

/// Signature as encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum WireSignature {
    /// ed25519 signature
    Ed25519([u8; 64]),
}

/// Creates the receiver account.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateAccountAction;

/// Deploys a native (wasm) contract to the receiver account.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct DeployContractAction {
    /// Contract code
    pub code: Vec<u8>,
}

/// Calls a function of the receiver contract.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FunctionCallAction {
    /// Function name
    pub method_name: String,
    /// Encoded arguments
    pub args: Vec<u8>,
    /// Attached gas
    pub gas: u64,
    /// Attached deposit
    pub deposit: u128,
}

/// Transfers tokens to the receiver.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransferAction {
    /// Transferred amount
    pub deposit: u128,
}

/// One step of a transaction. The variant order defines the wire tag.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Action {
    /// Tag 0
    CreateAccount(CreateAccountAction),
    /// Tag 1
    DeployContract(DeployContractAction),
    /// Tag 2
    FunctionCall(FunctionCallAction),
    /// Tag 3
    Transfer(TransferAction),
}

impl From<NativeTransaction> for Action {
    fn from(tx: NativeTransaction) -> Self {
        Self::FunctionCall(FunctionCallAction {
            method_name: tx.function_name,
            args: tx.args.to_vec(),
            gas: tx.gas,
            deposit: tx.deposit,
        })
    }
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    /// Signing account
    pub signer_id: String,
    /// Key the transaction is signed with
    pub public_key: WirePublicKey,
    /// Access key nonce, one above the last used
    pub nonce: u64,
    /// Receiving account
    pub receiver_id: String,
    /// Recent block hash, bounds the validity period
    pub block_hash: CryptoHash,
    /// Actions applied to the receiver in order
    pub actions: Vec<Action>,
}

impl Transaction {
    /// The transaction hash, `sha256(borsh(self))`.
    pub fn hash(&self) -> Result<CryptoHash> {
        let mut hasher = Sha256::new();
        self.serialize(&mut hasher)?;
        Ok(CryptoHash(hasher.finalize().into()))
    }

    /// Signs the transaction hash with `key`.
    pub fn sign(self, key: &SigningKey) -> Result<SignedTransaction> {
        let hash = self.hash()?;
        let signature = key.sign(hash.as_bytes());
        Ok(SignedTransaction {
            transaction: self,
            signature: WireSignature::Ed25519(signature.to_bytes()),
            hash,
        })
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The transaction
    pub transaction: Transaction,
    /// Signature over the transaction hash
    pub signature: WireSignature,
    hash: CryptoHash,
}

impl SignedTransaction {
    /// The transaction hash.
    pub const fn hash(&self) -> CryptoHash {
        self.hash
    }

    /// Whether the signature matches the transaction's public key.
    pub fn verify(&self) -> bool {
        let WireSignature::Ed25519(signature) = self.signature;
        PublicKey::from(self.transaction.public_key)
            .verify(self.hash.as_bytes(), &Signature::from_bytes(&signature))
    }

    /// Borsh encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = borsh::to_vec(&self.transaction)?;
        self.signature.serialize(&mut bytes)?;
        Ok(bytes)
    }

    /// Base64 of the borsh encoding, the form the RPC accepts.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Decodes the borsh encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        let transaction = Transaction::deserialize_reader(&mut reader)?;
        let signature = WireSignature::deserialize_reader(&mut reader)?;
        if !reader.is_empty() {
            return Err(BridgeError::InvalidResponse(format!(
                "{} trailing bytes after signed transaction",
                reader.len()
            )));
        }
        let hash = transaction.hash()?;
        Ok(Self { transaction, signature, hash })
    }

    /// Decodes the base64 form.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| BridgeError::InvalidResponse(format!("invalid base64 transaction: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
