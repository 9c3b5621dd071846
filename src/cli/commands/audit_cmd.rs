//! `saltvault audit` — display the audit log.
//!
//! Usage:
//!   saltvault audit                       # last 50 records for this vault
//!   saltvault audit --since 7d --op set
//!   saltvault audit --entry db_url --all  # every vault in the directory

use chrono::{DateTime, Utc};

use crate::audit::Operation;
use crate::cli::Context;
use crate::errors::{Result, SaltVaultError};

/// Flags of the `audit` command.
#[derive(Debug, Clone, Copy)]
pub struct AuditArgs<'a> {
    pub last: usize,
    pub since: Option<&'a str>,
    pub op: Option<Operation>,
    pub entry: Option<&'a str>,
    pub all_vaults: bool,
}

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(ctx: &Context, args: AuditArgs<'_>) -> Result<()> {
    use crate::audit::{AuditFilter, AuditLog};
    use crate::cli::output;

    let filter = AuditFilter {
        limit: args.last,
        since: args.since.map(parse_since).transpose()?,
        vault: (!args.all_vaults).then(|| ctx.vault_name.clone()),
        operation: args.op,
        entry_name: args.entry.map(str::to_string),
    };

    let log = AuditLog::open(&ctx.vault_dir)?;
    let records = log.query(&filter)?;

    if records.is_empty() {
        output::info("No audit records found.");
        return Ok(());
    }

    table::print(&records);
    Ok(())
}

#[cfg(not(feature = "audit-log"))]
pub fn execute(_ctx: &Context, args: AuditArgs<'_>) -> Result<()> {
    args.since.map(parse_since).transpose()?;
    Err(SaltVaultError::CommandFailed(
        "this build has no audit log (enable the `audit-log` feature)".into(),
    ))
}

/// Turn "7d", "24h" or "30m" into the instant that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        SaltVaultError::CommandFailed(format!(
            "invalid duration '{input}' (use a form like 7d, 24h or 30m)"
        ))
    };

    let split = input.len().checked_sub(1).ok_or_else(invalid)?;
    if !input.is_char_boundary(split) {
        return Err(invalid());
    }
    let (num_str, unit) = input.split_at(split);
    let num: i64 = num_str.parse().map_err(|_| invalid())?;

    let duration = match unit {
        "d" => chrono::Duration::try_days(num),
        "h" => chrono::Duration::try_hours(num),
        "m" => chrono::Duration::try_minutes(num),
        _ => None,
    }
    .ok_or_else(invalid)?;

    Ok(Utc::now() - duration)
}

#[cfg(feature = "audit-log")]
mod table {
    use comfy_table::{Cell, Color, ContentArrangement, Table};
    use console::style;

    use crate::audit::{AuditRecord, Operation, Outcome};

    pub(super) fn print(records: &[AuditRecord]) {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Time (UTC)", "Vault", "Operation", "Result", "Entry", "Key / details"]);

        for record in records {
            let event = &record.event;
            table.add_row(vec![
                Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(&record.vault),
                Cell::new(event.operation).fg(operation_color(event.operation)),
                Cell::new(event.outcome).fg(outcome_color(event.outcome)),
                Cell::new(event.entry_name.as_deref().unwrap_or("-")),
                Cell::new(event.describe()),
            ]);
        }

        println!("{}", style(format!("{} audit records:", records.len())).bold());
        println!("{table}");
    }

    fn operation_color(op: Operation) -> Color {
        match op {
            Operation::Init => Color::Green,
            Operation::Set => Color::Blue,
            Operation::Delete => Color::Red,
            Operation::RotateKey => Color::Yellow,
            Operation::Verify => Color::Cyan,
        }
    }

    fn outcome_color(outcome: Outcome) -> Color {
        match outcome {
            Outcome::Failed => Color::Red,
            _ => Color::Reset,
        }
    }

}
