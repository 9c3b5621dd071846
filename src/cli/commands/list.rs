//! `saltvault list` — display all entries in a table.

use crate::cli::output;
use crate::cli::{prompt_password, Context};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `list` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let password = prompt_password()?;
    let store = VaultStore::open(&ctx.vault_path, password.as_bytes())?;

    let entries = store.list_entries();

    output::info(&format!(
        "{} — {} entr{}",
        ctx.vault_name,
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));

    output::print_entries_table(&entries);

    Ok(())
}
