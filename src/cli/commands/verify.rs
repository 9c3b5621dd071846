//! `saltvault verify` — check the master password against the stored
//! authentication hash.  No entries are decrypted.

use crate::audit::{log_audit, AuditEvent, Operation, Outcome};
use crate::cli::output;
use crate::cli::{prompt_password, Context};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `verify` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let password = prompt_password()?;

    let result = VaultStore::verify_password(&ctx.vault_path, password.as_bytes());
    let outcome = if result.is_ok() {
        Outcome::Ok
    } else {
        Outcome::Failed
    };
    log_audit(ctx, &AuditEvent::new(Operation::Verify).outcome(outcome));

    result?;
    output::success(&format!("Password is correct for '{}'", ctx.vault_name));
    Ok(())
}
