//! Binary vault file format.
//!
//! A `.svault` file has this layout:
//!
//! ```text
//! [SVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][payload]
//! ```
//!
//! - **Magic** (`SVLT`): identifies the file as a SaltVault vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the payload begins.
//! - **Header JSON**: serialized `VaultHeader` (salt, authentication
//!   hash, KDF iteration count).
//! - **Payload**: the encrypted entries document, exactly as returned by
//!   `crypto::cipher::encrypt` (IV || ciphertext).
//!
//! There is no integrity tag.  A password is checked against the stored
//! authentication hash, not against the payload.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SaltVaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"SVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of a vault file.
///
/// Nothing here is secret: the salt and authentication hash are meant
/// to be stored in the clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// When this vault was first created.
    pub created_at: DateTime<Utc>,

    /// PBKDF2 iteration count used for the encryption key.
    pub iterations: u32,

    /// The vault salt (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// The 64-byte authentication hash (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub authentication_hash: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize the header to JSON.
/// 2. Write prefix + header + payload to a temp file in the same directory.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.
pub fn write_vault(path: &Path, header: &VaultHeader, payload: &[u8]) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| SaltVaultError::SerializationError(format!("header: {e}")))?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        SaltVaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + payload.len());

    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(payload); // IV || ciphertext

    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Raw data read from a vault file on disk.
pub struct RawVault {
    pub header: VaultHeader,
    /// The encrypted payload, not yet decrypted.
    pub payload: Vec<u8>,
}

/// Read a vault file from disk and split it into header and payload.
///
/// The payload shape (IV + whole blocks) is left for `decrypt` to check.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    if !path.exists() {
        return Err(SaltVaultError::VaultNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;

    if data.len() < PREFIX_LEN {
        return Err(SaltVaultError::InvalidVaultFormat(
            "file too small to be a valid vault".into(),
        ));
    }

    // --- Parse the fixed-size prefix ---

    if &data[0..4] != MAGIC {
        return Err(SaltVaultError::InvalidVaultFormat(
            "missing SVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(SaltVaultError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| SaltVaultError::InvalidVaultFormat("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        SaltVaultError::InvalidVaultFormat(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end > data.len() {
        return Err(SaltVaultError::InvalidVaultFormat(
            "header length exceeds file size".into(),
        ));
    }

    let header: VaultHeader = serde_json::from_slice(&data[PREFIX_LEN..header_end])
        .map_err(|e| SaltVaultError::InvalidVaultFormat(format!("header JSON: {e}")))?;

    let payload = data[header_end..].to_vec();

    Ok(RawVault { header, payload })
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
