use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SaltVault.
///
/// None of these are retryable: they signal malformed input or a
/// violated precondition, never a transient failure.
#[derive(Debug, Error)]
pub enum SaltVaultError {
    // --- Cipher errors ---
    #[error("plaintext is empty")]
    PlaintextEmpty,

    #[error("ciphertext is empty")]
    CiphertextEmpty,

    #[error("ciphertext too short")]
    CiphertextTooShort,

    #[error("ciphertext is not a multiple of the block size")]
    CiphertextNotMultipleOfBlockSize,

    #[error("invalid key size {0} (expected 16, 24 or 32 bytes)")]
    InvalidKeySize(usize),

    #[error("random number generator failed: {0}")]
    RandomSource(String),

    // --- Key derivation errors ---
    #[error("incorrect encryption key size {0} (expected 32 bytes)")]
    KeySizeMismatch(usize),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Wrong password — authentication hash does not match")]
    WrongPassword,

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("QR code error: {0}")]
    QrCodeError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for SaltVault results.
pub type Result<T> = std::result::Result<T, SaltVaultError>;
