//! `saltvault rotate-key` — change the vault master password.
//!
//! Unlocks with the current password, picks a fresh salt, derives new
//! secrets and re-encrypts the payload in place.  The write is atomic.

use crate::audit::{log_audit, AuditEvent, Operation};
use crate::cli::output;
use crate::cli::{prompt_new_password, prompt_password, Context, NEW_PASSWORD_ENV};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `rotate-key` command.
pub fn execute(ctx: &Context) -> Result<()> {
    output::info("Enter your current vault password.");
    let old_password = prompt_password()?;

    // Fail on a wrong password before asking for the new one.
    VaultStore::verify_password(&ctx.vault_path, old_password.as_bytes())?;
    let before = VaultStore::read_header(&ctx.vault_path)?;

    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let mut salt_provider = ctx.settings.salt_style.provider()?;
    let store = VaultStore::rotate_password(
        &ctx.vault_path,
        old_password.as_bytes(),
        new_password.as_bytes(),
        Some(&ctx.settings.pbkdf2_params()),
        salt_provider.as_mut(),
    )?;

    log_audit(
        ctx,
        &AuditEvent::new(Operation::RotateKey)
            .previous_key_params(before.iterations, &before.salt)
            .key_params(store.header().iterations, store.salt().as_bytes()),
    );

    output::success(&format!(
        "Password rotated for '{}' ({} entries re-encrypted)",
        ctx.vault_name,
        store.entry_count()
    ));
    output::info(&format!("New salt: {}", store.salt().to_display_string()));

    Ok(())
}
