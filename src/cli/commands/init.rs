//! `saltvault init` — create a new vault protected by a master password.

use std::fs;

use crate::audit::{log_audit, AuditEvent, Operation};
use crate::cli::output;
use crate::cli::{prompt_new_password, Context, PASSWORD_ENV};
use crate::errors::{Result, SaltVaultError};
use crate::vault::VaultStore;

/// Execute the `init` command.
pub fn execute(ctx: &Context) -> Result<()> {
    // 1. Create the vault directory if it doesn't exist.
    if !ctx.vault_dir.exists() {
        fs::create_dir_all(&ctx.vault_dir)?;
        output::info(&format!(
            "Created vault directory: {}",
            ctx.vault_dir.display()
        ));
    }

    // 2. Refuse to overwrite an existing vault.
    if ctx.vault_path.exists() {
        output::tip("Use `saltvault set` to add entries to the existing vault.");
        return Err(SaltVaultError::VaultAlreadyExists(ctx.vault_path.clone()));
    }

    // 3. Prompt for a new password (with confirmation).
    let password = prompt_new_password(PASSWORD_ENV)?;

    // 4. Pick a salt and write the empty vault.
    let mut salt_provider = ctx.settings.salt_style.provider()?;
    let store = VaultStore::create(
        &ctx.vault_path,
        password.as_bytes(),
        Some(&ctx.settings.pbkdf2_params()),
        salt_provider.as_mut(),
    )?;

    output::success(&format!(
        "Vault '{}' created at {}",
        ctx.vault_name,
        ctx.vault_path.display()
    ));
    output::info(&format!("Salt: {}", store.salt().to_display_string()));

    log_audit(
        ctx,
        &AuditEvent::new(Operation::Init)
            .key_params(store.header().iterations, store.salt().as_bytes()),
    );

    output::tip("Keep a copy of the salt: `saltvault show-salt --qr`.");
    output::tip("Run `saltvault set <NAME>` to add an entry.");

    Ok(())
}
