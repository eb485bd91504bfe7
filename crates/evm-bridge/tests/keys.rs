//! Tests for key resolution across sources.

use std::fs;

use evm_bridge::{
    AccountId, BridgeError, FileKeySource, InMemoryKeySource, KeySource, MergeKeySource,
    SigningKey,
};

fn account(id: &str) -> AccountId {
    id.parse().unwrap()
}

#[test]
fn test_second_source_key_is_used_when_first_has_none() {
    let alice = account("alice");
    let key = SigningKey::from_seed("alice");
    let keys = MergeKeySource::default()
        .with_source(InMemoryKeySource::new())
        .with_source(InMemoryKeySource::new().with_key(alice.clone(), key.clone()));

    assert_eq!(keys.resolve(&alice).unwrap(), key);
}

#[test]
fn test_first_source_wins() {
    let alice = account("alice");
    let first = SigningKey::from_seed("first");
    let second = SigningKey::from_seed("second");
    let keys = MergeKeySource::default()
        .with_source(InMemoryKeySource::new().with_key(alice.clone(), first.clone()))
        .with_source(InMemoryKeySource::new().with_key(alice.clone(), second));

    assert_eq!(keys.resolve(&alice).unwrap(), first);
}

#[test]
fn test_no_source_has_key() {
    let keys = MergeKeySource::default()
        .with_source(InMemoryKeySource::new())
        .with_source(InMemoryKeySource::new());

    let err = keys.resolve(&account("alice")).unwrap_err();
    assert!(matches!(err, BridgeError::KeyNotFound { account_id } if account_id.as_str() == "alice"));
    assert_eq!(keys.get_key(&account("alice")).unwrap(), None);
}

#[test]
fn test_file_source_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileKeySource::new(dir.path(), "local");
    let alice = account("alice.test");
    let key = SigningKey::from_seed("alice.test");

    let path = source.store(&alice, &key).unwrap();
    assert_eq!(path, dir.path().join("local").join("alice.test.json"));
    assert_eq!(source.get_key(&alice).unwrap(), Some(key));
    assert_eq!(source.get_key(&account("bob.test")).unwrap(), None);
}

#[test]
fn test_file_source_behind_memory_source() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileKeySource::new(dir.path(), "local");
    let bob = account("bob");
    let key = SigningKey::from_seed("bob");
    files.store(&bob, &key).unwrap();

    let keys = MergeKeySource::default().with_source(InMemoryKeySource::new()).with_source(files);
    assert_eq!(keys.resolve(&bob).unwrap(), key);
}

#[test]
fn test_file_source_rejects_mismatched_public_key() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileKeySource::new(dir.path(), "local");
    let alice = account("alice");
    let path = source.store(&alice, &SigningKey::from_seed("alice")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut file: serde_json::Value = serde_json::from_str(&content).unwrap();
    file["public_key"] = SigningKey::from_seed("mallory").public_key().to_string().into();
    fs::write(&path, file.to_string()).unwrap();

    assert!(matches!(source.get_key(&alice), Err(BridgeError::InvalidKey(_))));
}

#[test]
fn test_file_source_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileKeySource::new(dir.path(), "local");
    let alice = account("alice");
    let path = source.key_path(&alice);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "not json").unwrap();

    assert!(matches!(source.get_key(&alice), Err(BridgeError::InvalidKey(_))));
}

#[test]
fn test_reads_base58_credential_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileKeySource::new(dir.path(), "testnet");
    fs::create_dir_all(dir.path().join("testnet")).unwrap();
    let public_key = "ed25519:FVen3X669xLzsi6N2V91DoiyzHzg1uAgqiT8jZ9nS96Z";
    let secret = "ed25519:49W385L4rePHy6PAaQUovbD2aacgN4HsKXSMeUzRg4fmwXszN91JuMFrQRj3vMDpZuRF3ZknQBuRBoWQJEfXstMw";
    fs::write(
        dir.path().join("testnet").join("alice.testnet.json"),
        format!(r#"{{"account_id":"alice.testnet","public_key":"{public_key}","private_key":"{secret}"}}"#),
    )
    .unwrap();
    fs::write(
        dir.path().join("testnet").join("bob.testnet.json"),
        format!(r#"{{"account_id":"bob.testnet","public_key":"{public_key}","secret_key":"{secret}"}}"#),
    )
    .unwrap();

    let alice = source.get_key(&account("alice.testnet")).unwrap().unwrap();
    assert_eq!(alice.public_key().to_string(), public_key);
    let bob = source.get_key(&account("bob.testnet")).unwrap().unwrap();
    assert_eq!(bob, alice);
}
