use clap::Parser;
use saltvault::cli::commands;
use saltvault::cli::{output, Cli, Commands, Context};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> saltvault::errors::Result<()> {
    // Completions need neither settings nor a valid vault name.
    if let Commands::Completions { ref shell } = cli.command {
        return commands::completions::execute(shell);
    }

    let ctx = Context::resolve(cli)?;

    match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Set {
            ref name,
            ref value,
            kind,
        } => commands::set::execute(&ctx, name, value.as_deref(), kind),
        Commands::Get { ref name } => commands::get::execute(&ctx, name),
        Commands::List => commands::list::execute(&ctx),
        Commands::Delete { ref name, force } => commands::delete::execute(&ctx, name, force),
        Commands::Verify => commands::verify::execute(&ctx),
        Commands::RotateKey => commands::rotate::execute(&ctx),
        Commands::Salt { words, qr, level } => commands::salt::execute(&ctx, words, qr, level),
        Commands::ShowSalt { qr, level } => commands::show_salt::execute(&ctx, qr, level),
        Commands::Audit {
            last,
            ref since,
            op,
            ref entry,
            all,
        } => commands::audit_cmd::execute(
            &ctx,
            commands::audit_cmd::AuditArgs {
                last,
                since: since.as_deref(),
                op,
                entry: entry.as_deref(),
                all_vaults: all,
            },
        ),
        Commands::Completions { .. } => Ok(()),
    }
}
