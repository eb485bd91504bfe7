use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KeySource, PublicKey, SigningKey};
use crate::{AccountId, BridgeError, Result};

/// Name of the default credentials directory under the home directory.
pub const DEFAULT_CREDENTIALS_DIR: &str = ".near-credentials";

/// Contents of a credential file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    /// The account the key belongs to
    pub account_id: AccountId,
    /// `ed25519:<base58>` public key
    pub public_key: PublicKey,
    /// `ed25519:<base58>` secret key
    #[serde(alias = "secret_key")]
    pub private_key: String,
}

/// Unencrypted keys stored as one JSON file per account, under
/// `<root>/<network_id>/<account_id>.json`.
#[derive(Debug, Clone)]
pub struct FileKeySource {
    root: PathBuf,
    network_id: String,
}

impl FileKeySource {
    /// Creates a source reading keys of `network_id` below `root`.
    pub fn new(root: impl Into<PathBuf>, network_id: impl Into<String>) -> Self {
        Self { root: root.into(), network_id: network_id.into() }
    }

    /// The default credentials root, `~/.near-credentials`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_CREDENTIALS_DIR))
    }

    /// Path of the credential file of `account_id`.
    pub fn key_path(&self, account_id: &AccountId) -> PathBuf {
        self.root.join(&self.network_id).join(format!("{account_id}.json"))
    }

    /// Writes the credential file of `account_id`, replacing an existing one.
    pub fn store(&self, account_id: &AccountId, key: &SigningKey) -> Result<PathBuf> {
        let path = self.key_path(account_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = KeyFile {
            account_id: account_id.clone(),
            public_key: key.public_key(),
            private_key: key.to_secret_string(),
        };
        fs::write(&path, serde_json::to_vec_pretty(&file)?)?;
        debug!(%account_id, path = %path.display(), "Stored key file");
        Ok(path)
    }

    fn read_key_file(path: &Path) -> Result<Option<KeyFile>> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| BridgeError::InvalidKey(format!("{}: {e}", path.display())))
    }
}

impl KeySource for FileKeySource {
    fn get_key(&self, account_id: &AccountId) -> Result<Option<SigningKey>> {
        let path = self.key_path(account_id);
        let Some(file) = Self::read_key_file(&path)? else {
            return Ok(None);
        };

        let key: SigningKey = file.private_key.parse()?;
        if key.public_key() != file.public_key {
            return Err(BridgeError::InvalidKey(format!(
                "{}: public key does not match private key",
                path.display()
            )));
        }
        if &file.account_id != account_id {
            return Err(BridgeError::InvalidKey(format!(
                "{}: file belongs to account {}",
                path.display(),
                file.account_id
            )));
        }
        Ok(Some(key))
    }
}
