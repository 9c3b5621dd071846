//! `saltvault show-salt` — print the salt stored in a vault header.
//!
//! The salt is not secret, so no password is asked for.

use crate::cli::output;
use crate::cli::Context;
use crate::errors::Result;
use crate::salt::{render_salt_qr, QrLevel};
use crate::vault::VaultStore;

/// Execute the `show-salt` command.
pub fn execute(ctx: &Context, qr: bool, level: Option<QrLevel>) -> Result<()> {
    let salt = VaultStore::read_salt(&ctx.vault_path)?;

    output::info(&format!("Salt for '{}':", ctx.vault_name));
    println!("{}", salt.to_display_string());

    if qr {
        println!();
        println!(
            "{}",
            render_salt_qr(salt.as_bytes(), level.unwrap_or(ctx.settings.qr_level))?
        );
    }

    Ok(())
}
