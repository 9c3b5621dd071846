//! `saltvault set` — add or update an entry in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::audit::{log_audit, AuditEvent, Operation, Outcome};
use crate::cli::output;
use crate::cli::{prompt_password, Context};
use crate::errors::{Result, SaltVaultError};
use crate::vault::{EntryKind, EntryValue, VaultStore};

/// Execute the `set` command.
pub fn execute(ctx: &Context, name: &str, value: Option<&str>, kind: EntryKind) -> Result<()> {
    // Determine the raw value from one of three sources.
    let raw = Zeroizing::new(if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line — it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 3: Interactive secure prompt (default).
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {name}"))
            .interact()
            .map_err(|e| SaltVaultError::CommandFailed(format!("input prompt: {e}")))?
    });

    let entry = EntryValue::parse_as(kind, &raw)?;

    // Open the vault, set the entry, and save.
    let password = prompt_password()?;
    let mut store = VaultStore::open(&ctx.vault_path, password.as_bytes())?;

    let kind = entry.kind_name();
    let outcome = if store.set_entry(name, entry)? {
        Outcome::Updated
    } else {
        Outcome::Added
    };
    store.save()?;

    log_audit(
        ctx,
        &AuditEvent::new(Operation::Set).outcome(outcome).entry(name, kind),
    );

    output::success(&format!(
        "Entry '{}' {} in {} ({} total)",
        name,
        outcome,
        ctx.vault_name,
        store.entry_count()
    ));

    Ok(())
}
