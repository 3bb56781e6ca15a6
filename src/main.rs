use clap::Parser;
use credvault::cli::{Cli, Commands, TokenAction};
use credvault::config::Settings;

fn main() {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself.
    let log_level = std::env::current_dir()
        .ok()
        .and_then(|cwd| Settings::load(&cwd).ok())
        .map_or_else(|| "warn".to_string(), |s| s.log_level);
    credvault::logging::init(&log_level);

    let result = match cli.command {
        Commands::Encrypt { ref value } => {
            credvault::cli::commands::encrypt::execute(&cli, value.as_deref())
        }
        Commands::Decrypt { ref ciphertext } => {
            credvault::cli::commands::decrypt::execute(&cli, ciphertext.as_deref())
        }
        Commands::Hash { ref value } => {
            credvault::cli::commands::hash::execute_hash(value.as_deref())
        }
        Commands::Verify {
            ref digest,
            ref value,
        } => credvault::cli::commands::hash::execute_verify(digest, value.as_deref()),
        Commands::Keygen => credvault::cli::commands::keygen::execute(&cli),
        Commands::Token { ref action } => match action {
            TokenAction::Set { user, kind, value } => {
                credvault::cli::commands::token::execute_set(&cli, user, *kind, value.as_deref())
            }
            TokenAction::Get { user, kind } => {
                credvault::cli::commands::token::execute_get(&cli, user, *kind)
            }
            TokenAction::Clear { user, kind } => {
                credvault::cli::commands::token::execute_clear(&cli, user, *kind)
            }
            TokenAction::Status { user } => {
                credvault::cli::commands::token::execute_status(&cli, user)
            }
        },
        Commands::Audit { last, ref since } => {
            credvault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => {
            credvault::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
