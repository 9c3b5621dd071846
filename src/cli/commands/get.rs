//! `saltvault get` — print a single entry's value.

use crate::cli::{prompt_password, Context};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `get` command.
pub fn execute(ctx: &Context, name: &str) -> Result<()> {
    let password = prompt_password()?;
    let store = VaultStore::open(&ctx.vault_path, password.as_bytes())?;

    println!("{}", store.get_entry(name)?);

    Ok(())
}
