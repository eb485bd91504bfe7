//! Signing keys and the sources they are resolved from.
//!
//! A [`MergeKeySource`] holds an ordered list of [`KeySource`]s. Resolving an account walks the
//! list front to back and returns the key of the first source that has one, so earlier sources
//! shadow later ones.

use core::{fmt, str::FromStr};

use auto_impl::auto_impl;
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::{AccountId, BridgeError, Result};

mod file;
pub use file::*;

mod memory;
pub use memory::*;

pub use ed25519_dalek::Signature;

/// Prefix of the text form of keys.
const ED25519_PREFIX: &str = "ed25519:";

/// Decodes `ed25519:<base58>` (prefix optional) into raw bytes.
fn decode_key_text(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let body = s.strip_prefix(ED25519_PREFIX).unwrap_or(s);
    bs58::decode(body).into_vec().map_err(|e| BridgeError::InvalidKey(format!("{s}: {e}")))
}

/// An ed25519 public key of a native account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wraps raw key bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verifies `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .is_ok_and(|key| key.verify(message, signature).is_ok())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ED25519_PREFIX}{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_key_text(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BridgeError::InvalidKey(format!("public key must be 32 bytes: {s}")))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for PublicKey {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_string()
    }
}

/// An ed25519 signing key.
///
/// The text form is `ed25519:<base58>` of the 64-byte `secret || public` keypair, the layout
/// credential files use. A bare 32-byte secret is accepted as well. For the 64-byte form the
/// public half must match.
#[derive(Clone)]
pub struct SigningKey(ed25519_dalek::SigningKey);

impl SigningKey {
    /// Creates a key from the 32 secret bytes.
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(secret))
    }

    /// Derives a deterministic key from `seed`. Intended for local networks and tests.
    pub fn from_seed(seed: &str) -> Self {
        let secret: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self::from_bytes(&secret)
    }

    /// The public half of this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().to_bytes())
    }

    /// Signs `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message)
    }

    /// The text form of the keypair, `ed25519:<base58>`.
    pub fn to_secret_string(&self) -> String {
        format!("{ED25519_PREFIX}{}", bs58::encode(self.0.to_keypair_bytes()).into_string())
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes() == other.0.to_bytes()
    }
}

impl Eq for SigningKey {}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("public_key", &self.public_key()).finish_non_exhaustive()
    }
}

impl FromStr for SigningKey {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_key_text(s)?;
        match bytes.len() {
            32 => {
                let mut secret = [0u8; 32];
                secret.copy_from_slice(&bytes);
                Ok(Self::from_bytes(&secret))
            }
            64 => {
                let mut secret = [0u8; 32];
                secret.copy_from_slice(&bytes[..32]);
                let key = Self::from_bytes(&secret);
                if key.public_key().as_bytes()[..] != bytes[32..] {
                    return Err(BridgeError::InvalidKey(
                        "public half of the secret key does not match".to_string(),
                    ));
                }
                Ok(key)
            }
            len => Err(BridgeError::InvalidKey(format!("secret key must be 32 or 64 bytes, got {len}"))),
        }
    }
}

/// A source of signing keys indexed by account id.
#[auto_impl(&, Box, Arc)]
pub trait KeySource: fmt::Debug + Send + Sync {
    /// Returns the key for `account_id`, or `None` if this source has no entry for it.
    fn get_key(&self, account_id: &AccountId) -> Result<Option<SigningKey>>;
}

/// Resolves keys from an ordered list of sources, first match wins.
#[derive(Debug, Default)]
pub struct MergeKeySource {
    sources: Vec<Box<dyn KeySource>>,
}

impl MergeKeySource {
    /// Creates a resolver over `sources`, highest priority first.
    pub fn new(sources: Vec<Box<dyn KeySource>>) -> Self {
        Self { sources }
    }

    /// Appends a source with the lowest priority so far.
    pub fn with_source(mut self, source: impl KeySource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether there are no sources at all.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the key of the first source that holds one for `account_id`.
    ///
    /// Fails with [`BridgeError::KeyNotFound`] if no source does. An error from a source
    /// aborts the lookup; later sources are not consulted.
    pub fn resolve(&self, account_id: &AccountId) -> Result<SigningKey> {
        for (priority, source) in self.sources.iter().enumerate() {
            if let Some(key) = source.get_key(account_id)? {
                trace!(%account_id, priority, "Resolved signing key");
                return Ok(key);
            }
        }
        Err(BridgeError::KeyNotFound { account_id: account_id.clone() })
    }
}

impl KeySource for MergeKeySource {
    fn get_key(&self, account_id: &AccountId) -> Result<Option<SigningKey>> {
        match self.resolve(account_id) {
            Ok(key) => Ok(Some(key)),
            Err(BridgeError::KeyNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_text_roundtrip() {
        let key = SigningKey::from_seed("alice");
        let parsed: SigningKey = key.to_secret_string().parse().unwrap();
        assert_eq!(parsed, key);

        let public: PublicKey = key.public_key().to_string().parse().unwrap();
        assert_eq!(public, key.public_key());
    }

    #[test]
    fn test_sign_and_verify() {
        let key = SigningKey::from_seed("bob");
        let signature = key.sign(b"payload");
        assert!(key.public_key().verify(b"payload", &signature));
        assert!(!key.public_key().verify(b"other", &signature));
    }

    #[test]
    fn test_reject_mismatched_keypair() {
        let key = SigningKey::from_seed("carol");
        let other = SigningKey::from_seed("dave");
        let mut keypair = key.0.to_keypair_bytes();
        keypair[32..].copy_from_slice(other.public_key().as_bytes());
        let text = format!("ed25519:{}", bs58::encode(keypair).into_string());
        assert!(matches!(text.parse::<SigningKey>(), Err(BridgeError::InvalidKey(_))));
    }

    #[test]
    fn test_base58_key_text() {
        let keypair = "ed25519:49W385L4rePHy6PAaQUovbD2aacgN4HsKXSMeUzRg4fmwXszN91JuMFrQRj3vMDpZuRF3ZknQBuRBoWQJEfXstMw";
        let key: SigningKey = keypair.parse().unwrap();
        assert_eq!(
            key.public_key().to_string(),
            "ed25519:FVen3X669xLzsi6N2V91DoiyzHzg1uAgqiT8jZ9nS96Z"
        );
        assert_eq!(key.to_secret_string(), keypair);

        let secret: SigningKey =
            "ed25519:BbMQkQYZspmkytduTWvXEtc4mMURjsekJDvty2WtKeSb".parse().unwrap();
        assert_eq!(secret, key);
        assert!("ed25519:0x9d61".parse::<SigningKey>().is_err());
    }
}
