//! `saltvault delete` — remove an entry from the vault.

use dialoguer::Confirm;

use crate::audit::{log_audit, AuditEvent, Operation};
use crate::cli::output;
use crate::cli::{prompt_password, Context};
use crate::errors::{Result, SaltVaultError};
use crate::vault::VaultStore;

/// Execute the `delete` command.
pub fn execute(ctx: &Context, name: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| SaltVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let password = prompt_password()?;
    let mut store = VaultStore::open(&ctx.vault_path, password.as_bytes())?;

    let removed = store.delete_entry(name)?;
    store.save()?;

    log_audit(
        ctx,
        &AuditEvent::new(Operation::Delete).entry(name, removed.kind_name()),
    );
    output::success(&format!("Deleted entry '{name}'"));

    Ok(())
}
