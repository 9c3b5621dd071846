//! Salt generation.
//!
//! Vault salts are usually a handful of pronounceable pseudo-words
//! joined by hyphens (`"bofa-kitureso-mel-zaporu"`), so a user can
//! write one down or read it off a QR code.  A raw 32-byte salt is
//! available for callers that never need to show it to a person.
//!
//! The RNG that shapes word salts is passed in at construction time.
//! It does not need to be cryptographically strong (the salt is not
//! secret), but each generator owns its own stream, so two callers
//! never share or race on RNG state.

pub mod qr;

use std::fmt;
use std::str::FromStr;

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng, TryRngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SaltVaultError};

pub use qr::{render_salt_qr, QrLevel};

/// Shortest pseudo-word, in characters.
pub const MIN_WORD_LEN: usize = 3;

/// Longest pseudo-word, in characters.
pub const MAX_WORD_LEN: usize = 8;

/// Word-count range used by `generate_random_salt` (inclusive).
pub const MIN_RANDOM_WORDS: usize = 4;
pub const MAX_RANDOM_WORDS: usize = 6;

/// Length of a raw random salt in bytes (256 bits).
pub const RAW_SALT_LEN: usize = 32;

const CONSONANTS: &[u8] = b"bcdfghjklmnprstvwz";
const VOWELS: &[u8] = b"aeiou";

/// A per-vault salt.  Not secret, immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The salt as text if it is printable ASCII (word salts), hex otherwise.
    pub fn to_display_string(&self) -> String {
        if !self.0.is_empty() && self.0.iter().all(|b| b.is_ascii_graphic()) {
            String::from_utf8_lossy(&self.0).into_owned()
        } else {
            hex::encode(&self.0)
        }
    }
}

impl From<Vec<u8>> for Salt {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Salt {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_display_string())
    }
}

/// Anything that can hand out a fresh salt for a new vault.
pub trait SaltProvider {
    fn provide_salt(&mut self) -> Result<Salt>;
}

/// Generates hyphen-joined pseudo-word salts from an injected RNG.
pub struct WordSaltGenerator<R> {
    rng: R,
}

impl<R: Rng> WordSaltGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate `words` pseudo-words joined by single hyphens.
    ///
    /// The result always contains exactly `words - 1` hyphens.
    pub fn generate_salt(&mut self, words: usize) -> Salt {
        let words: Vec<String> = (0..words).map(|_| self.generate_word()).collect();
        Salt::new(words.join("-").into_bytes())
    }

    /// Generate a salt of 4 to 6 words, picked by the injected RNG.
    pub fn generate_random_salt(&mut self) -> Salt {
        let words = self.rng.random_range(MIN_RANDOM_WORDS..=MAX_RANDOM_WORDS);
        self.generate_salt(words)
    }

    /// One lowercase word of alternating consonants and vowels.
    fn generate_word(&mut self) -> String {
        let len = self.rng.random_range(MIN_WORD_LEN..=MAX_WORD_LEN);
        let mut vowel = self.rng.random_bool(0.3);
        let mut word = String::with_capacity(len);

        while word.len() < len {
            let pool = if vowel { VOWELS } else { CONSONANTS };
            word.push(char::from(pool[self.rng.random_range(0..pool.len())]));
            vowel = !vowel;
        }
        word
    }
}

impl WordSaltGenerator<StdRng> {
    /// A generator with its own `StdRng`, seeded from the OS.
    pub fn from_os_entropy() -> Result<Self> {
        let rng = StdRng::try_from_os_rng()
            .map_err(|e| SaltVaultError::RandomSource(e.to_string()))?;
        Ok(Self::new(rng))
    }
}

impl<R: Rng> SaltProvider for WordSaltGenerator<R> {
    fn provide_salt(&mut self) -> Result<Salt> {
        Ok(self.generate_random_salt())
    }
}

/// Produces 32 bytes straight from the OS random source.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomBytesSalt;

impl SaltProvider for RandomBytesSalt {
    fn provide_salt(&mut self) -> Result<Salt> {
        let mut bytes = vec![0u8; RAW_SALT_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SaltVaultError::RandomSource(e.to_string()))?;
        Ok(Salt::new(bytes))
    }
}

/// Which kind of salt new vaults get (`salt_style` in the config file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaltStyle {
    #[default]
    Words,
    Bytes,
}

impl SaltStyle {
    /// Build the matching provider.
    pub fn provider(self) -> Result<Box<dyn SaltProvider>> {
        match self {
            SaltStyle::Words => Ok(Box::new(WordSaltGenerator::from_os_entropy()?)),
            SaltStyle::Bytes => Ok(Box::new(RandomBytesSalt)),
        }
    }
}

impl FromStr for SaltStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "words" => Ok(SaltStyle::Words),
            "bytes" => Ok(SaltStyle::Bytes),
            other => Err(format!("unknown salt style '{other}' — use words or bytes")),
        }
    }
}
