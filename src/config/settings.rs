use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{Pbkdf2Params, PBKDF2_ITERATIONS};
use crate::errors::{Result, SaltVaultError};
use crate::salt::{QrLevel, SaltStyle};

/// Project-level configuration, loaded from `.saltvault.toml`.
///
/// Every field has a sensible default so SaltVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Which vault to use when none is specified (e.g. "main").
    #[serde(default = "default_vault")]
    pub default_vault: String,

    /// Directory (relative to project root) where vault files are stored.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// PBKDF2 iteration count for new vaults (default: 101 101).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Salt kind for new vaults: "words" or "bytes".
    #[serde(default)]
    pub salt_style: SaltStyle,

    /// QR error-correction level used when showing a salt.
    #[serde(default)]
    pub qr_level: QrLevel,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault() -> String {
    "main".to_string()
}

fn default_vault_dir() -> String {
    ".saltvault".to_string()
}

fn default_pbkdf2_iterations() -> u32 {
    PBKDF2_ITERATIONS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_vault: default_vault(),
            vault_dir: default_vault_dir(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            salt_style: SaltStyle::default(),
            qr_level: QrLevel::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".saltvault.toml";

    /// Load settings from `<project_dir>/.saltvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            SaltVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the full path to a vault file.
    ///
    /// Example: `project_dir/.saltvault/main.svault`
    pub fn vault_path(&self, project_dir: &Path, vault_name: &str) -> PathBuf {
        project_dir
            .join(&self.vault_dir)
            .join(format!("{vault_name}.svault"))
    }

    /// Convert the PBKDF2 setting into crypto-layer params.
    pub fn pbkdf2_params(&self) -> Pbkdf2Params {
        Pbkdf2Params {
            iterations: self.pbkdf2_iterations,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
