//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` wraps the binary format layer and the crypto layer so
//! that the rest of the application can work with simple method calls
//! like `store.set_entry("db_url", EntryValue::Text(..))`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::cipher::{
    decrypt, encrypt, must_decrypt, must_encrypt, reencrypt, BLOCK_SIZE,
};
use crate::crypto::kdf::{
    derive_encryption_key_with_params, verify_authentication_hash, AuthenticationHash,
    Pbkdf2Params,
};
use crate::crypto::secrets::{generate_vault_secrets_with_params, VaultSecrets};
use crate::errors::{Result, SaltVaultError};
use crate::salt::{Salt, SaltProvider};

use super::entry::{EntriesDocument, EntryValue};
use super::format::{self, RawVault, VaultHeader, CURRENT_VERSION};

/// Name and type of an entry, without its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub name: String,
    pub kind: &'static str,
}

/// The main vault handle.  Create one with `VaultStore::create` or
/// `VaultStore::open`, then use its methods to manage entries.
pub struct VaultStore {
    /// Path to the `.svault` file on disk.
    path: PathBuf,

    /// Header metadata (version, salt, hash, timestamps).
    header: VaultHeader,

    /// Decrypted entries.
    entries: EntriesDocument,

    /// Salt, authentication hash and the encryption key (zeroized on drop).
    secrets: VaultSecrets,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault file at `path`.
    ///
    /// Takes a salt from `salt_provider`, derives the encryption key and
    /// authentication hash from the password, and writes an empty vault
    /// to disk.
    ///
    /// Pass `None` for `params` to use the default iteration count.
    pub fn create(
        path: &Path,
        password: &[u8],
        params: Option<&Pbkdf2Params>,
        salt_provider: &mut dyn SaltProvider,
    ) -> Result<Self> {
        if path.exists() {
            return Err(SaltVaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        let params = params.copied().unwrap_or_default();
        let secrets = generate_vault_secrets_with_params(password, salt_provider, &params)?;
        let header = build_header(&secrets, params, Utc::now());
        let entries = EntriesDocument::default();

        // The key was derived just above and the document always
        // serializes to a non-empty JSON object.
        let plaintext = serialize_entries(&entries)?;
        let payload = must_encrypt(&plaintext, secrets.encryption_key.as_bytes());
        format::write_vault(path, &header, &payload)?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            entries,
            secrets,
        })
    }

    /// Open an existing vault file.
    ///
    /// The password is checked against the stored authentication hash
    /// before the payload is decrypted, so a wrong password fails with
    /// `WrongPassword` rather than a garbled payload.
    pub fn open(path: &Path, password: &[u8]) -> Result<Self> {
        let (raw, secrets) = unlock(path, password)?;

        let plaintext = Zeroizing::new(decrypt(&raw.payload, secrets.encryption_key.as_bytes())?);
        let entries = EntriesDocument::from_bytes(&plaintext)?;

        Ok(Self {
            path: path.to_path_buf(),
            header: raw.header,
            entries,
            secrets,
        })
    }

    /// Change the master password of the vault at `path`.
    ///
    /// Verifies `old_password`, takes a fresh salt, derives new secrets
    /// from `new_password` and re-encrypts the stored payload under the
    /// new key without parsing it.  Pass `None` for `params` to keep the
    /// vault's current iteration count.
    pub fn rotate_password(
        path: &Path,
        old_password: &[u8],
        new_password: &[u8],
        params: Option<&Pbkdf2Params>,
        salt_provider: &mut dyn SaltProvider,
    ) -> Result<Self> {
        let (raw, old_secrets) = unlock(path, old_password)?;

        let params = params.copied().unwrap_or(Pbkdf2Params {
            iterations: raw.header.iterations,
        });
        let new_secrets = generate_vault_secrets_with_params(new_password, salt_provider, &params)?;

        let payload = reencrypt(
            &raw.payload,
            old_secrets.encryption_key.as_bytes(),
            new_secrets.encryption_key.as_bytes(),
        )?;
        drop(old_secrets);

        let header = build_header(&new_secrets, params, raw.header.created_at);
        format::write_vault(path, &header, &payload)?;

        // The payload was produced a moment ago under this very key.
        let plaintext = Zeroizing::new(must_decrypt(
            &payload,
            new_secrets.encryption_key.as_bytes(),
        ));
        let entries = EntriesDocument::from_bytes(&plaintext)?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            entries,
            secrets: new_secrets,
        })
    }

    /// Read a vault's header without a password.
    pub fn read_header(path: &Path) -> Result<VaultHeader> {
        format::read_vault(path).map(|raw| raw.header)
    }

    /// Read a vault's salt without a password.  The salt is not secret.
    pub fn read_salt(path: &Path) -> Result<Salt> {
        Self::read_header(path).map(|header| Salt::new(header.salt))
    }

    /// Check `password` against the vault at `path` without decrypting
    /// any entries.
    pub fn verify_password(path: &Path, password: &[u8]) -> Result<()> {
        unlock(path, password).map(|_| ())
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add or update an entry.  Returns `true` if it replaced an old value.
    pub fn set_entry(&mut self, name: &str, value: EntryValue) -> Result<bool> {
        Self::validate_entry_name(name)?;
        Ok(self.entries.entries.insert(name.to_string(), value).is_some())
    }

    /// Look up an entry.
    pub fn get_entry(&self, name: &str) -> Result<&EntryValue> {
        Self::validate_entry_name(name)?;
        self.entries
            .entries
            .get(name)
            .ok_or_else(|| SaltVaultError::EntryNotFound(name.to_string()))
    }

    /// Remove an entry from the vault.
    pub fn delete_entry(&mut self, name: &str) -> Result<EntryValue> {
        Self::validate_entry_name(name)?;
        self.entries
            .entries
            .remove(name)
            .ok_or_else(|| SaltVaultError::EntryNotFound(name.to_string()))
    }

    /// List entry names and kinds, sorted by name.
    pub fn list_entries(&self) -> Vec<EntryMetadata> {
        self.entries
            .entries
            .iter()
            .map(|(name, value)| EntryMetadata {
                name: name.clone(),
                kind: value.kind_name(),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt the entries and write the vault to disk atomically.
    pub fn save(&mut self) -> Result<()> {
        let plaintext = serialize_entries(&self.entries)?;
        let payload = encrypt(&plaintext, self.secrets.encryption_key.as_bytes())?;
        format::write_vault(&self.path, &self.header, &payload)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of entries in the vault.
    pub fn entry_count(&self) -> usize {
        self.entries.entries.len()
    }

    /// Returns `true` if the vault contains an entry with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.entries.contains_key(name)
    }

    /// Returns the vault creation timestamp.
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.header.created_at
    }

    pub fn salt(&self) -> &Salt {
        &self.secrets.salt
    }

    pub fn authentication_hash(&self) -> &AuthenticationHash {
        &self.secrets.authentication_hash
    }

    /// Returns a reference to the vault header.
    pub fn header(&self) -> &VaultHeader {
        &self.header
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Validate that an entry name is safe.
    ///
    /// Allowed: ASCII letters, digits, underscores, hyphens, periods.
    /// Must be non-empty and at most 256 characters.
    fn validate_entry_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(SaltVaultError::CommandFailed(
                "entry name cannot be empty".into(),
            ));
        }
        if name.len() > 256 {
            return Err(SaltVaultError::CommandFailed(
                "entry name cannot exceed 256 characters".into(),
            ));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
        {
            return Err(SaltVaultError::CommandFailed(format!(
                "entry name '{name}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
            )));
        }
        Ok(())
    }
}

/// Read the vault at `path` and check `password` against its
/// authentication hash.  Returns the raw file and the derived secrets.
fn unlock(path: &Path, password: &[u8]) -> Result<(RawVault, VaultSecrets)> {
    let raw = format::read_vault(path)?;

    let salt = Salt::new(raw.header.salt.clone());
    let expected = AuthenticationHash::from_slice(&raw.header.authentication_hash)?;
    let params = Pbkdf2Params {
        iterations: raw.header.iterations,
    };

    let encryption_key = derive_encryption_key_with_params(password, salt.as_bytes(), &params)?;
    verify_authentication_hash(encryption_key.as_bytes(), salt.as_bytes(), &expected)?;

    Ok((
        raw,
        VaultSecrets {
            authentication_hash: expected,
            salt,
            encryption_key,
        },
    ))
}

/// Serialize the entries for encryption.
///
/// A length of `k * 16 + 1` would get 15 padding bytes, which `decrypt`
/// never strips, so one trailing space (valid JSON whitespace) is added.
fn serialize_entries(entries: &EntriesDocument) -> Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(entries.to_bytes()?);
    if bytes.len() % BLOCK_SIZE == 1 {
        bytes.push(b' ');
    }
    Ok(bytes)
}

fn build_header(
    secrets: &VaultSecrets,
    params: Pbkdf2Params,
    created_at: chrono::DateTime<Utc>,
) -> VaultHeader {
    VaultHeader {
        version: CURRENT_VERSION,
        created_at,
        iterations: params.iterations,
        salt: secrets.salt.as_bytes().to_vec(),
        authentication_hash: secrets.authentication_hash.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_entries_never_need_fifteen_padding_bytes() {
        let mut doc = EntriesDocument::default();
        for i in 0..40 {
            doc.entries
                .insert(format!("k{i}"), EntryValue::Text("x".repeat(i)));
            let bytes = serialize_entries(&doc).unwrap();
            assert_ne!(bytes.len() % BLOCK_SIZE, 1);

            let key = [7u8; 32];
            let blob = encrypt(&bytes, &key).unwrap();
            let back = EntriesDocument::from_bytes(&decrypt(&blob, &key).unwrap()).unwrap();
            assert_eq!(back, doc);
        }
    }

    #[test]
    fn entry_names_are_validated() {
        assert!(VaultStore::validate_entry_name("db_url").is_ok());
        assert!(VaultStore::validate_entry_name("api.key-2").is_ok());
        assert!(VaultStore::validate_entry_name("").is_err());
        assert!(VaultStore::validate_entry_name("has space").is_err());
        assert!(VaultStore::validate_entry_name(&"a".repeat(257)).is_err());
    }
}
