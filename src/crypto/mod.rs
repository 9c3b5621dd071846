//! Cryptographic primitives for SaltVault.
//!
//! This module provides:
//! - AES-CBC encryption, decryption and re-encryption (`cipher`)
//! - PBKDF2-SHA512 key and authentication-hash derivation (`kdf`)
//! - Vault secret generation on top of a salt provider (`secrets`)

pub mod cipher;
pub mod kdf;
pub mod secrets;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_encryption_key, ...};
pub use cipher::{decrypt, encrypt, must_decrypt, must_encrypt, must_reencrypt, reencrypt};
pub use kdf::{
    derive_authentication_hash, derive_encryption_key, derive_encryption_key_with_params,
    verify_authentication_hash, AuthenticationHash, EncryptionKey, Pbkdf2Params,
};
pub use secrets::{generate_vault_secrets, generate_vault_secrets_with_params, VaultSecrets};
