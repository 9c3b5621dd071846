//! Integration tests for the SaltVault vault module.

use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;
use saltvault::crypto::Pbkdf2Params;
use saltvault::errors::SaltVaultError;
use saltvault::salt::{RandomBytesSalt, WordSaltGenerator};
use saltvault::vault::{EntryKind, EntryValue, VaultStore};
use tempfile::TempDir;

/// Keep the tests fast; production uses 101 101 iterations.
const FAST: Pbkdf2Params = Pbkdf2Params { iterations: 1_000 };

/// Helper: create a temporary vault file path inside a fresh temp dir.
fn vault_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.svault");
    (dir, path)
}

fn words(seed: u64) -> WordSaltGenerator<StdRng> {
    WordSaltGenerator::new(StdRng::seed_from_u64(seed))
}

// ---------------------------------------------------------------------------
// Create and re-open round-trip
// ---------------------------------------------------------------------------

#[test]
fn create_vault_and_reopen() {
    let (_dir, path) = vault_path();
    let password = b"test-password";

    let mut store = VaultStore::create(&path, password, Some(&FAST), &mut words(1)).unwrap();
    store
        .set_entry("db_url", EntryValue::Text("postgres://localhost/db".into()))
        .unwrap();
    store.set_entry("port", EntryValue::Integer(5432)).unwrap();
    store.save().unwrap();

    let reopened = VaultStore::open(&path, password).expect("open vault");
    assert_eq!(reopened.entry_count(), 2);
    assert_eq!(
        reopened.get_entry("db_url").unwrap(),
        &EntryValue::Text("postgres://localhost/db".into())
    );
    assert_eq!(reopened.get_entry("port").unwrap(), &EntryValue::Integer(5432));
    assert_eq!(reopened.salt().as_bytes(), store.salt().as_bytes());
}

#[test]
fn every_entry_kind_survives_a_save() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"pw-kinds", Some(&FAST), &mut words(2)).unwrap();

    let inputs = [
        ("t", EntryKind::Text, "hello"),
        ("i", EntryKind::Integer, "-12"),
        ("f", EntryKind::Float, "2.5"),
        ("b", EntryKind::Bool, "true"),
        ("x", EntryKind::Bytes, "deadbeef"),
        ("j", EntryKind::Json, r#"{"hosts":["a","b"],"retries":3}"#),
    ];
    for (name, kind, raw) in inputs {
        store
            .set_entry(name, EntryValue::parse_as(kind, raw).unwrap())
            .unwrap();
    }
    store.save().unwrap();

    let reopened = VaultStore::open(&path, b"pw-kinds").unwrap();
    assert_eq!(reopened.get_entry("x").unwrap(), &EntryValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
    assert_eq!(reopened.get_entry("b").unwrap(), &EntryValue::Bool(true));
    assert_eq!(reopened.list_entries().len(), inputs.len());
}

#[test]
fn create_refuses_to_overwrite() {
    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"pw", Some(&FAST), &mut words(3)).unwrap();

    let result = VaultStore::create(&path, b"pw", Some(&FAST), &mut words(3));
    assert!(matches!(result, Err(SaltVaultError::VaultAlreadyExists(_))));
}

#[test]
fn create_rejects_too_few_iterations() {
    let (_dir, path) = vault_path();
    let weak = Pbkdf2Params { iterations: 10 };
    let result = VaultStore::create(&path, b"pw", Some(&weak), &mut words(3));
    assert!(matches!(result, Err(SaltVaultError::KeyDerivationFailed(_))));
    assert!(!path.exists());
}

#[test]
fn byte_salts_work_too() {
    let (_dir, path) = vault_path();
    let store = VaultStore::create(&path, b"pw", Some(&FAST), &mut RandomBytesSalt).unwrap();
    assert_eq!(store.salt().len(), 32);
    assert!(VaultStore::verify_password(&path, b"pw").is_ok());
}

// ---------------------------------------------------------------------------
// Passwords
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_is_rejected() {
    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"right", Some(&FAST), &mut words(4)).unwrap();

    assert!(matches!(
        VaultStore::open(&path, b"wrong"),
        Err(SaltVaultError::WrongPassword)
    ));
    assert!(matches!(
        VaultStore::verify_password(&path, b"wrong"),
        Err(SaltVaultError::WrongPassword)
    ));
    assert!(VaultStore::verify_password(&path, b"right").is_ok());
}

#[test]
fn open_missing_vault_fails() {
    let (_dir, path) = vault_path();
    assert!(matches!(
        VaultStore::open(&path, b"pw"),
        Err(SaltVaultError::VaultNotFound(_))
    ));
}

#[test]
fn corrupted_file_is_rejected() {
    let (_dir, path) = vault_path();
    fs::write(&path, b"not a vault at all").unwrap();
    assert!(matches!(
        VaultStore::open(&path, b"pw"),
        Err(SaltVaultError::InvalidVaultFormat(_))
    ));
}

// ---------------------------------------------------------------------------
// Password rotation
// ---------------------------------------------------------------------------

#[test]
fn rotate_password_keeps_entries_and_changes_salt() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"old-pass", Some(&FAST), &mut words(5)).unwrap();
    store.set_entry("api_key", EntryValue::Text("abc123".into())).unwrap();
    store.save().unwrap();
    let old_salt = store.salt().as_bytes().to_vec();
    let created = store.created_at();
    drop(store);

    let rotated =
        VaultStore::rotate_password(&path, b"old-pass", b"new-pass", None, &mut words(6)).unwrap();
    assert_ne!(rotated.salt().as_bytes(), old_salt.as_slice());
    assert_eq!(rotated.created_at(), created);
    assert_eq!(rotated.header().iterations, FAST.iterations);

    assert!(matches!(
        VaultStore::open(&path, b"old-pass"),
        Err(SaltVaultError::WrongPassword)
    ));
    let reopened = VaultStore::open(&path, b"new-pass").unwrap();
    assert_eq!(
        reopened.get_entry("api_key").unwrap(),
        &EntryValue::Text("abc123".into())
    );
}

#[test]
fn rotate_with_wrong_old_password_leaves_file_untouched() {
    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"old-pass", Some(&FAST), &mut words(7)).unwrap();
    let before = fs::read(&path).unwrap();

    let result = VaultStore::rotate_password(&path, b"nope", b"new-pass", None, &mut words(8));
    assert!(matches!(result, Err(SaltVaultError::WrongPassword)));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Entry operations
// ---------------------------------------------------------------------------

#[test]
fn set_reports_replacement_and_delete_returns_value() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"pw", Some(&FAST), &mut words(9)).unwrap();

    assert!(!store.set_entry("k", EntryValue::Bool(false)).unwrap());
    assert!(store.set_entry("k", EntryValue::Bool(true)).unwrap());
    assert_eq!(store.delete_entry("k").unwrap(), EntryValue::Bool(true));
    assert!(matches!(
        store.delete_entry("k"),
        Err(SaltVaultError::EntryNotFound(_))
    ));
    assert!(matches!(
        store.get_entry("k"),
        Err(SaltVaultError::EntryNotFound(_))
    ));
}

#[test]
fn list_entries_is_sorted_with_kinds() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"pw", Some(&FAST), &mut words(10)).unwrap();
    store.set_entry("zeta", EntryValue::Float(0.5)).unwrap();
    store.set_entry("alpha", EntryValue::Text("a".into())).unwrap();

    let names: Vec<_> = store.list_entries().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["alpha", "zeta"]);
}

#[test]
fn read_salt_needs_no_password() {
    let (_dir, path) = vault_path();
    let store = VaultStore::create(&path, b"pw", Some(&FAST), &mut words(11)).unwrap();

    let salt = VaultStore::read_salt(&path).unwrap();
    assert_eq!(salt.as_bytes(), store.salt().as_bytes());
    assert!(salt.to_display_string().contains('-'));
}

#[test]
fn read_header_reports_key_parameters() {
    let (_dir, path) = vault_path();
    let store = VaultStore::create(&path, b"pw", Some(&FAST), &mut words(13)).unwrap();

    let header = VaultStore::read_header(&path).unwrap();
    assert_eq!(header.iterations, FAST.iterations);
    assert_eq!(header.salt, store.salt().as_bytes());
    assert_eq!(header.created_at, store.created_at());
}

#[cfg(unix)]
#[test]
fn vault_file_has_restrictive_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"pw", Some(&FAST), &mut words(12)).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
