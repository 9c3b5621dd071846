//! `saltvault salt` — print a freshly generated salt.
//!
//! Usage:
//!   saltvault salt                 # 4 to 6 pronounceable words
//!   saltvault salt --words 8
//!   saltvault salt --qr --level H

use crate::cli::Context;
use crate::errors::Result;
use crate::salt::{render_salt_qr, QrLevel, WordSaltGenerator};

/// Execute the `salt` command.
pub fn execute(ctx: &Context, words: Option<u8>, qr: bool, level: Option<QrLevel>) -> Result<()> {
    let salt = match words {
        Some(n) => WordSaltGenerator::from_os_entropy()?.generate_salt(usize::from(n)),
        None => ctx.settings.salt_style.provider()?.provide_salt()?,
    };

    println!("{}", salt.to_display_string());

    if qr {
        let level = level.unwrap_or(ctx.settings.qr_level);
        println!();
        println!("{}", render_salt_qr(salt.as_bytes(), level)?);
    }

    Ok(())
}
