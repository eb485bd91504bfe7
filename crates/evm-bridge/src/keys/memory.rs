use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use super::{KeySource, SigningKey};
use crate::{AccountId, Result};

/// Keys held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryKeySource {
    keys: RwLock<HashMap<AccountId, SigningKey>>,
}

impl InMemoryKeySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, builder style.
    pub fn with_key(self, account_id: AccountId, key: SigningKey) -> Self {
        self.insert(account_id, key);
        self
    }

    /// Inserts or replaces the key of `account_id`.
    pub fn insert(&self, account_id: AccountId, key: SigningKey) -> Option<SigningKey> {
        self.keys.write().unwrap_or_else(PoisonError::into_inner).insert(account_id, key)
    }

    /// Removes the key of `account_id`.
    pub fn remove(&self, account_id: &AccountId) -> Option<SigningKey> {
        self.keys.write().unwrap_or_else(PoisonError::into_inner).remove(account_id)
    }
}

impl KeySource for InMemoryKeySource {
    fn get_key(&self, account_id: &AccountId) -> Result<Option<SigningKey>> {
        Ok(self.keys.read().unwrap_or_else(PoisonError::into_inner).get(account_id).cloned())
    }
}
