//! Two-stage password-based key derivation using PBKDF2-HMAC-SHA512.
//!
//! Stage one stretches the master password into a 32-byte encryption
//! key with a large iteration count.  Stage two folds that key (with
//! the same salt) into a 64-byte authentication hash using a single
//! iteration.  The hash can be stored and compared to check a password
//! without revealing the key: recovering the key from the hash still
//! means brute-forcing stage one.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, SaltVaultError};

/// Length of the derived encryption key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Length of the authentication hash in bytes.
pub const AUTH_HASH_LEN: usize = 64;

/// Default PBKDF2 iteration count for the encryption key.
pub const PBKDF2_ITERATIONS: u32 = 101_101;

/// Minimum iteration count accepted by `derive_encryption_key_with_params`.
const MIN_ITERATIONS: u32 = 1_000;

/// Configurable PBKDF2 parameters for stage one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

/// A 32-byte encryption key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// The 64-byte password verifier derived from an `EncryptionKey`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticationHash {
    bytes: [u8; AUTH_HASH_LEN],
}

impl AuthenticationHash {
    pub fn as_bytes(&self) -> &[u8; AUTH_HASH_LEN] {
        &self.bytes
    }

    /// Rebuild a hash from its stored form.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; AUTH_HASH_LEN] = bytes.try_into().map_err(|_| {
            SaltVaultError::InvalidVaultFormat(format!(
                "authentication hash must be {AUTH_HASH_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Lowercase hex rendering, for display.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Debug for AuthenticationHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthenticationHash({})", self.to_hex())
    }
}

/// Derive the 32-byte encryption key from a password and salt.
///
/// Uses the default iteration count.  The same password + salt always
/// produce the same key.
pub fn derive_encryption_key(password: &[u8], salt: &[u8]) -> EncryptionKey {
    let mut bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password, salt, PBKDF2_ITERATIONS, &mut bytes);
    let key = EncryptionKey::new(bytes);
    bytes.zeroize();
    key
}

/// Derive the encryption key with an explicit iteration count.
///
/// Rejects iteration counts below the minimum so a bad config file
/// cannot silently produce a cheap-to-crack key.
pub fn derive_encryption_key_with_params(
    password: &[u8],
    salt: &[u8],
    params: &Pbkdf2Params,
) -> Result<EncryptionKey> {
    if params.iterations < MIN_ITERATIONS {
        return Err(SaltVaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password, salt, params.iterations, &mut bytes);
    let key = EncryptionKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Fold an already-derived encryption key into the authentication hash.
///
/// Fails with `KeySizeMismatch` unless `encryption_key` is exactly
/// 32 bytes: the hash must bind to the stretched key, not to an
/// arbitrary buffer.
pub fn derive_authentication_hash(encryption_key: &[u8], salt: &[u8]) -> Result<AuthenticationHash> {
    if encryption_key.len() != KEY_LEN {
        return Err(SaltVaultError::KeySizeMismatch(encryption_key.len()));
    }

    let mut bytes = [0u8; AUTH_HASH_LEN];
    pbkdf2_hmac::<Sha512>(encryption_key, salt, 1, &mut bytes);
    Ok(AuthenticationHash { bytes })
}

/// Check that `encryption_key` folds to `expected`.
///
/// Uses constant-time comparison to avoid timing side channels.
pub fn verify_authentication_hash(
    encryption_key: &[u8],
    salt: &[u8],
    expected: &AuthenticationHash,
) -> Result<()> {
    let actual = derive_authentication_hash(encryption_key, salt)?;

    if actual.bytes[..].ct_eq(&expected.bytes[..]).into() {
        Ok(())
    } else {
        Err(SaltVaultError::WrongPassword)
    }
}
