//! Vault secret generation: salt -> encryption key -> authentication hash.

use crate::errors::Result;
use crate::salt::{Salt, SaltProvider};

use super::kdf::{
    derive_authentication_hash, derive_encryption_key, derive_encryption_key_with_params,
    AuthenticationHash, EncryptionKey, Pbkdf2Params,
};

/// Everything produced when a new vault is created.
///
/// Fields drop in declaration order, so `encryption_key` (the only
/// sensitive one) is zeroized last.
#[derive(Debug)]
pub struct VaultSecrets {
    pub authentication_hash: AuthenticationHash,
    pub salt: Salt,
    pub encryption_key: EncryptionKey,
}

/// Generate a fresh salt and derive the key and hash for `master_password`.
///
/// Uses the default PBKDF2 iteration count.
pub fn generate_vault_secrets(
    master_password: &[u8],
    salt_provider: &mut dyn SaltProvider,
) -> Result<VaultSecrets> {
    let salt = salt_provider.provide_salt()?;
    let encryption_key = derive_encryption_key(master_password, salt.as_bytes());
    let authentication_hash =
        derive_authentication_hash(encryption_key.as_bytes(), salt.as_bytes())?;

    Ok(VaultSecrets {
        authentication_hash,
        salt,
        encryption_key,
    })
}

/// Same as `generate_vault_secrets` with an explicit iteration count.
pub fn generate_vault_secrets_with_params(
    master_password: &[u8],
    salt_provider: &mut dyn SaltProvider,
    params: &Pbkdf2Params,
) -> Result<VaultSecrets> {
    let salt = salt_provider.provide_salt()?;
    let encryption_key =
        derive_encryption_key_with_params(master_password, salt.as_bytes(), params)?;
    let authentication_hash =
        derive_authentication_hash(encryption_key.as_bytes(), salt.as_bytes())?;

    Ok(VaultSecrets {
        authentication_hash,
        salt,
        encryption_key,
    })
}
