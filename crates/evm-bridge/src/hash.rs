use core::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// A 32-byte hash on the native chain: transaction hashes, receipt ids, block and code
/// hashes.
///
/// The node writes these as base58 text.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CryptoHash(pub [u8; 32]);

impl CryptoHash {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0; 32]);

    /// A hash with every byte set to `byte`.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 32])
    }

    /// A hash that is zero except for its last eight bytes, which hold `value` big-endian.
    pub const fn from_index(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    /// The raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for CryptoHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CryptoHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CryptoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for CryptoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for CryptoHash {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| BridgeError::InvalidHash(format!("{s}: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            BridgeError::InvalidHash(format!("{s}: expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for CryptoHash {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CryptoHash> for String {
    fn from(hash: CryptoHash) -> Self {
        hash.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_text() {
        assert_eq!(CryptoHash::ZERO.to_string(), "11111111111111111111111111111111");
        let hash: CryptoHash = "CktRuQ2mttgRGkXJtyksdKHjUdc2C4TgDzyB98oEzy8".parse().unwrap();
        assert_eq!(hash.to_string(), "CktRuQ2mttgRGkXJtyksdKHjUdc2C4TgDzyB98oEzy8");
        assert_eq!(serde_json::to_value(hash).unwrap(), hash.to_string());
    }

    #[test]
    fn test_rejects_bad_text() {
        assert!(matches!("0OIl".parse::<CryptoHash>(), Err(BridgeError::InvalidHash(_))));
        assert!(matches!("3yZe7d".parse::<CryptoHash>(), Err(BridgeError::InvalidHash(_))));
        let hex = format!("0x{}", "01".repeat(32));
        assert!(hex.parse::<CryptoHash>().is_err());
    }

    #[test]
    fn test_from_index_is_distinct_past_one_byte() {
        assert_ne!(CryptoHash::from_index(0), CryptoHash::from_index(256));
        assert_eq!(CryptoHash::from_index(258).0[30..], [1, 2]);
    }
}
