//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::VaultCodec;
use crate::errors::{CredVaultError, Result};
use crate::profile::{FileProfileStore, TokenKind};

/// CredVault CLI: at-rest protection for third-party API tokens.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Encrypt, decrypt and hash third-party API tokens",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory for the profile store and audit log (default: .credvault)
    #[arg(long, global = true, env = "CREDVAULT_DATA_DIR")]
    pub data_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt a value with the configured key
    Encrypt {
        /// Value to encrypt (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Decrypt a value produced by `encrypt`
    Decrypt {
        /// Ciphertext (omit to read stdin or prompt)
        ciphertext: Option<String>,
    },

    /// Print the SHA-256 digest of a value
    Hash {
        /// Value to hash (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Check a value against a digest
    Verify {
        /// Hex digest produced by `hash`
        digest: String,
        /// Candidate value (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Generate a fresh encryption secret
    Keygen,

    /// Manage per-user stored tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// View the audit log of credential operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Token subcommands.
#[derive(clap::Subcommand)]
pub enum TokenAction {
    /// Encrypt and store a token for a user
    Set {
        /// User id
        user: String,
        /// Token kind: deploy or generation
        kind: TokenKind,
        /// Token value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Decrypt and print a user's token
    Get {
        /// User id
        user: String,
        /// Token kind: deploy or generation
        kind: TokenKind,
    },

    /// Remove a user's token
    Clear {
        /// User id
        user: String,
        /// Token kind: deploy or generation
        kind: TokenKind,
    },

    /// Show which tokens a user has configured
    Status {
        /// User id
        user: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved project directory and settings for one command run.
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
}

impl Context {
    /// Load `.credvault.toml` from the working directory, applying the
    /// `--data-dir` override.
    pub fn load(cli: &Cli) -> Result<Self> {
        let project_dir = std::env::current_dir()?;
        let mut settings = Settings::load(&project_dir)?;
        if let Some(dir) = &cli.data_dir {
            settings.data_dir = dir.clone();
        }
        Ok(Self {
            project_dir,
            settings,
        })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.settings.data_path(&self.project_dir)
    }

    /// Build the codec from the configured key.  Fails when the key
    /// variable is unset; there is no fallback.
    pub fn codec(&self) -> Result<VaultCodec> {
        Ok(VaultCodec::new(self.settings.load_key()?))
    }

    /// Open the profile store for `operation`.  A failed open is recorded
    /// in the audit log under that operation.
    pub fn open_store(
        &self,
        codec: &VaultCodec,
        operation: &str,
        user_id: &str,
        kind: Option<TokenKind>,
    ) -> Result<FileProfileStore> {
        let store = FileProfileStore::open(&self.settings.store_path(&self.project_dir), codec.key());
        if store.is_err() {
            self.audit(operation, Some(user_id), kind, &store);
        }
        store
    }

    /// Record an operation in the audit log, if one is available.
    ///
    /// Never fails the parent operation.  Nothing is recorded when the
    /// data directory does not exist yet.
    pub fn audit<T>(
        &self,
        operation: &str,
        user_id: Option<&str>,
        kind: Option<TokenKind>,
        result: &Result<T>,
    ) {
        #[cfg(feature = "audit-log")]
        {
            let dir = self.data_dir();
            if !dir.is_dir() {
                return;
            }
            if let Some(log) = crate::audit::AuditLog::open(&dir) {
                log.log(
                    operation,
                    user_id,
                    kind.map(TokenKind::as_str),
                    crate::audit::outcome_of(result),
                );
            }
        }

        #[cfg(not(feature = "audit-log"))]
        let _ = (operation, user_id, kind, result);
    }
}

/// Read a value from one of three sources:
/// 1. The command-line argument, if given.
/// 2. Piped stdin (one trailing line ending stripped).
/// 3. An interactive prompt; `hidden` masks the input.
///
/// Returns `Zeroizing<String>` so the value is wiped from memory on drop.
pub fn read_value(arg: Option<&str>, prompt: &str, hidden: bool) -> Result<Zeroizing<String>> {
    if let Some(v) = arg {
        if hidden {
            output::warning("Value provided on command line — it may appear in shell history.");
        }
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(strip_line_ending(&buf).to_string()));
    }

    let value = if hidden {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
    } else {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
    }
    .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?;

    Ok(Zeroizing::new(value))
}

/// Strip a single trailing `\n` or `\r\n`; other whitespace is part of
/// the value.
fn strip_line_ending(value: &str) -> &str {
    let value = value.strip_suffix('\n').unwrap_or(value);
    value.strip_suffix('\r').unwrap_or(value)
}
