//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::audit::Operation;
use crate::config::Settings;
use crate::errors::{Result, SaltVaultError};
use crate::salt::QrLevel;
use crate::vault::EntryKind;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the vault password (CI/CD).
pub const PASSWORD_ENV: &str = "SALTVAULT_PASSWORD";

/// Environment variable holding the replacement password for `rotate-key`.
pub const NEW_PASSWORD_ENV: &str = "SALTVAULT_NEW_PASSWORD";

/// SaltVault CLI: password-protected vault with pronounceable salts.
#[derive(Parser)]
#[command(
    name = "saltvault",
    about = "Password-protected vault with pronounceable salts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault to use (default: `default_vault` from .saltvault.toml, else main)
    #[arg(short, long, global = true)]
    pub vault: Option<String>,

    /// Vault directory (default: `vault_dir` from .saltvault.toml, else .saltvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master password
    Init,

    /// Set an entry (add or update)
    Set {
        /// Entry name (e.g. db_url)
        name: String,
        /// Entry value (omit for interactive prompt)
        value: Option<String>,
        /// How to read the value: text, int, float, bool, bytes (hex) or json
        #[arg(short, long, default_value = "text")]
        kind: EntryKind,
    },

    /// Print an entry's value
    Get {
        /// Entry name
        name: String,
    },

    /// List all entries
    List,

    /// Delete an entry
    Delete {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Check the master password without decrypting entries
    Verify,

    /// Change the vault's master password (new salt, entries re-encrypted)
    RotateKey,

    /// Generate a fresh salt
    Salt {
        /// Number of words (default: 4 to 6, chosen at random)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=32))]
        words: Option<u8>,
        /// Also print the salt as a QR code
        #[arg(long)]
        qr: bool,
        /// QR error-correction level: L, M, Q or H
        #[arg(long)]
        level: Option<QrLevel>,
    },

    /// Show the salt of an existing vault (no password needed)
    ShowSalt {
        /// Also print the salt as a QR code
        #[arg(long)]
        qr: bool,
        /// QR error-correction level: L, M, Q or H
        #[arg(long)]
        level: Option<QrLevel>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of records to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show records since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
        /// Only this operation: init, set, delete, rotate-key or verify
        #[arg(long)]
        op: Option<Operation>,
        /// Only records touching this entry
        #[arg(long)]
        entry: Option<String>,
        /// Include every vault in the directory, not just the selected one
        #[arg(long)]
        all: bool,
    },
}

// ---------------------------------------------------------------------------
// Resolved command context
// ---------------------------------------------------------------------------

/// CLI arguments merged with `.saltvault.toml`.
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
    /// Absolute directory holding vault files and the audit database.
    pub vault_dir: PathBuf,
    pub vault_name: String,
    /// Full path to `<vault_dir>/<vault_name>.svault`.
    pub vault_path: PathBuf,
}

impl Context {
    /// Load settings from the current directory and apply CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let project_dir = std::env::current_dir()?;
        let mut settings = Settings::load(&project_dir)?;

        if let Some(dir) = &cli.vault_dir {
            settings.vault_dir = dir.clone();
        }

        let vault_name = cli
            .vault
            .clone()
            .unwrap_or_else(|| settings.default_vault.clone());
        validate_vault_name(&vault_name)?;

        let vault_dir = project_dir.join(&settings.vault_dir);
        let vault_path = settings.vault_path(&project_dir, &vault_name);

        Ok(Self {
            project_dir,
            settings,
            vault_dir,
            vault_name,
            vault_path,
        })
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `SALTVAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| SaltVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// Respects `env_var` for scripted/CI usage (`SALTVAULT_PASSWORD` for
/// `init`, `SALTVAULT_NEW_PASSWORD` for `rotate-key`).
/// Enforces a minimum password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(SaltVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| SaltVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Validate that a vault name is safe to use as a file name.
///
/// Allowed: lowercase letters, digits, hyphens. Must not be empty
/// or start/end with a hyphen. Max length 64 characters.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SaltVaultError::ConfigError(
            "vault name cannot be empty".into(),
        ));
    }

    if name.len() > 64 {
        return Err(SaltVaultError::ConfigError(
            "vault name cannot exceed 64 characters".into(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SaltVaultError::ConfigError(format!(
            "vault name '{name}' is invalid — only lowercase letters, digits, and hyphens are allowed"
        )));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(SaltVaultError::ConfigError(format!(
            "vault name '{name}' cannot start or end with a hyphen"
        )));
    }

    Ok(())
}
