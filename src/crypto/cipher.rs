//! AES-CBC encryption with trailing-byte padding.
//!
//! Each call to `encrypt` generates a fresh random 16-byte IV and
//! prepends it to the ciphertext.  `decrypt` splits the IV back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte IV | ciphertext (multiple of 16 bytes) ]
//!
//! The key length selects the cipher: 16 bytes for AES-128, 24 for
//! AES-192 and 32 for AES-256.
//!
//! **No integrity protection.**  There is no authentication tag, so a
//! modified blob decrypts to garbage instead of failing.  Padding is
//! only appended when the plaintext is not block-aligned, and `decrypt`
//! strips it with a best-effort check on the trailing bytes.  A genuine
//! payload that happens to end in `n` bytes of value `n` (with
//! `0 < n < 15`) is indistinguishable from padding and will be cut
//! short.  An authenticated construction would remove both problems,
//! but blobs written by this module would then no longer be readable.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, SaltVaultError};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of the IV prepended to every blob (one block).
pub const IV_LEN: usize = BLOCK_SIZE;

/// Key lengths accepted by `encrypt` and `decrypt`.
pub const VALID_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Encrypt `plaintext` with a 16, 24 or 32-byte `key`.
///
/// Returns the IV prepended to the ciphertext (IV || ciphertext).
/// Plaintext that is already a multiple of the block size is encrypted
/// as-is, with no padding block appended.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(SaltVaultError::PlaintextEmpty);
    }
    check_key_size(key)?;

    let padded = pad(plaintext);

    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| SaltVaultError::RandomSource(e.to_string()))?;

    let ciphertext = match key.len() {
        16 => cbc_encrypt::<Aes128>(key, &iv, &padded)?,
        24 => cbc_encrypt::<Aes192>(key, &iv, &padded)?,
        _ => cbc_encrypt::<Aes256>(key, &iv, &padded)?,
    };

    let mut output = Vec::with_capacity(IV_LEN + ciphertext.len());
    output.extend_from_slice(&iv);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt a blob that was produced by `encrypt`.
///
/// Expects the first 16 bytes to be the IV, followed by a non-empty,
/// block-aligned ciphertext.
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < BLOCK_SIZE {
        return Err(SaltVaultError::CiphertextTooShort);
    }

    let (iv, body) = blob.split_at(IV_LEN);
    if body.is_empty() {
        return Err(SaltVaultError::CiphertextEmpty);
    }
    if body.len() % BLOCK_SIZE != 0 {
        return Err(SaltVaultError::CiphertextNotMultipleOfBlockSize);
    }
    check_key_size(key)?;

    let plaintext = match key.len() {
        16 => cbc_decrypt::<Aes128>(key, iv, body)?,
        24 => cbc_decrypt::<Aes192>(key, iv, body)?,
        _ => cbc_decrypt::<Aes256>(key, iv, body)?,
    };

    Ok(unpad(plaintext))
}

/// Decrypt `blob` under `old_key` and encrypt the result under `new_key`.
///
/// Errors from either half are returned unchanged.  The intermediate
/// plaintext is zeroized before returning.
pub fn reencrypt(blob: &[u8], old_key: &[u8], new_key: &[u8]) -> Result<Vec<u8>> {
    let plaintext = Zeroizing::new(decrypt(blob, old_key)?);
    encrypt(&plaintext, new_key)
}

/// `encrypt` for inputs the caller has already validated.
///
/// # Panics
///
/// Panics if encryption fails.  Never call this on untrusted input.
///
/// The release profile builds with `panic = "abort"`, so there the
/// process stops on the spot.  Under the unwinding strategy (debug and
/// test builds, or a library consumer's own profile) the panic unwinds
/// and can be caught with `std::panic::catch_unwind`.
pub fn must_encrypt(plaintext: &[u8], key: &[u8]) -> Vec<u8> {
    match encrypt(plaintext, key) {
        Ok(blob) => blob,
        Err(e) => panic!("encryption of validated input failed: {e}"),
    }
}

/// `decrypt` for inputs the caller has already validated.
///
/// # Panics
///
/// Panics if decryption fails.  Never call this on untrusted input.
///
/// The release profile builds with `panic = "abort"`, so there the
/// process stops on the spot.  Under the unwinding strategy (debug and
/// test builds, or a library consumer's own profile) the panic unwinds
/// and can be caught with `std::panic::catch_unwind`.
pub fn must_decrypt(blob: &[u8], key: &[u8]) -> Vec<u8> {
    match decrypt(blob, key) {
        Ok(plaintext) => plaintext,
        Err(e) => panic!("decryption of validated input failed: {e}"),
    }
}

/// `reencrypt` for inputs the caller has already validated.
///
/// # Panics
///
/// Panics if either the decrypt or the encrypt step fails.
///
/// The release profile builds with `panic = "abort"`, so there the
/// process stops on the spot.  Under the unwinding strategy (debug and
/// test builds, or a library consumer's own profile) the panic unwinds
/// and can be caught with `std::panic::catch_unwind`.
pub fn must_reencrypt(blob: &[u8], old_key: &[u8], new_key: &[u8]) -> Vec<u8> {
    match reencrypt(blob, old_key, new_key) {
        Ok(blob) => blob,
        Err(e) => panic!("re-encryption of validated input failed: {e}"),
    }
}

/// Length of the ciphertext body `encrypt` produces for `plaintext_len`
/// bytes of input (IV not included).
pub fn padded_len(plaintext_len: usize) -> usize {
    match plaintext_len % BLOCK_SIZE {
        0 => plaintext_len,
        rem => plaintext_len + (BLOCK_SIZE - rem),
    }
}

fn check_key_size(key: &[u8]) -> Result<()> {
    if VALID_KEY_SIZES.contains(&key.len()) {
        Ok(())
    } else {
        Err(SaltVaultError::InvalidKeySize(key.len()))
    }
}

/// Append `n` bytes of value `n` up to the next block boundary.
/// Aligned input is copied unchanged.
fn pad(plaintext: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut padded = Zeroizing::new(Vec::with_capacity(padded_len(plaintext.len())));
    padded.extend_from_slice(plaintext);

    let rem = plaintext.len() % BLOCK_SIZE;
    if rem != 0 {
        let padding = BLOCK_SIZE - rem;
        // padding < BLOCK_SIZE, so it always fits in a byte.
        padded.resize(plaintext.len() + padding, padding as u8);
    }
    padded
}

/// Strip trailing padding if the last byte looks like a pad length.
///
/// Only values 1..=14 are recognised; anything else is returned as-is.
fn unpad(mut plaintext: Vec<u8>) -> Vec<u8> {
    let Some(&last) = plaintext.last() else {
        return plaintext;
    };
    let n = usize::from(last);

    if n > 0 && n < 15 && n <= plaintext.len() {
        let start = plaintext.len() - n;
        if plaintext[start..].iter().all(|&b| b == last) {
            plaintext.truncate(start);
        }
    }
    plaintext
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], padded: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let encryptor = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SaltVaultError::InvalidKeySize(key.len()))?;
    Ok(encryptor.encrypt_padded_vec_mut::<NoPadding>(padded))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| SaltVaultError::InvalidKeySize(key.len()))?;
    decryptor
        .decrypt_padded_vec_mut::<NoPadding>(body)
        .map_err(|_| SaltVaultError::CiphertextNotMultipleOfBlockSize)
}
