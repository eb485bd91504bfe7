//! Native chain accounts and their EVM-side addresses.

use core::{fmt, str::FromStr};

use alloy_primitives::{keccak256, Address};
use serde::{Deserialize, Serialize};

use crate::{constants::MAX_ACCOUNT_ID_LEN, BridgeError};

/// A validated native account identifier, e.g. `alice.test.near`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Deref)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Validates `id` and wraps it.
    ///
    /// Accepts lowercase alphanumerics and the separators `.`, `_` and `-`, up to
    /// [`MAX_ACCOUNT_ID_LEN`] characters. The empty string is rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, BridgeError> {
        let id = id.into();
        let valid_char =
            |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-');
        if id.is_empty() || id.len() > MAX_ACCOUNT_ID_LEN || !id.chars().all(valid_char) {
            return Err(BridgeError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Returns the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address the EVM contract uses for this account: the last 20 bytes of
    /// `keccak256(account_id)`.
    pub fn evm_address(&self) -> Address {
        Address::from_slice(&keccak256(self.0.as_bytes())[12..])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl FromStr for AccountId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A native account as seen by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The account id
    pub id: AccountId,
    /// Last known balance, informational only
    pub balance: Option<u128>,
}

impl Account {
    /// Creates an account with an unknown balance.
    pub const fn new(id: AccountId) -> Self {
        Self { id, balance: None }
    }

    /// The EVM address of this account.
    pub fn evm_address(&self) -> Address {
        self.id.evm_address()
    }
}

impl From<AccountId> for Account {
    fn from(id: AccountId) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_validation() {
        assert!(AccountId::new("alice.test.near").is_ok());
        assert!(AccountId::new("evm_1-x").is_ok());
        assert!(matches!(AccountId::new(""), Err(BridgeError::InvalidAccountId(_))));
        assert!(AccountId::new("Alice").is_err());
        assert!(AccountId::new("a".repeat(MAX_ACCOUNT_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_evm_address_is_keccak_suffix() {
        let id = AccountId::new("alice").unwrap();
        let hash = keccak256(b"alice");
        assert_eq!(id.evm_address().as_slice(), &hash[12..]);
    }

    #[test]
    fn test_account_id_serde() {
        let id: AccountId = serde_json::from_str("\"bob.near\"").unwrap();
        assert_eq!(id.as_str(), "bob.near");
        assert!(serde_json::from_str::<AccountId>("\"\"").is_err());
    }
}
