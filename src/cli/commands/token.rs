//! `credvault token` — per-user token storage.
//!
//! Subcommands:
//! - `credvault token set <USER> <KIND> [VALUE]` — encrypt and store
//! - `credvault token get <USER> <KIND>`         — decrypt and print
//! - `credvault token clear <USER> <KIND>`       — remove
//! - `credvault token status <USER>`             — which tokens exist
//!
//! A token that was never set and a token that cannot be decrypted are
//! reported differently.

use crate::cli::output;
use crate::cli::{read_value, Cli, Context};
use crate::errors::{CredVaultError, Result};
use crate::profile::{validate_user_id, TokenKind, TokenService};

/// Execute `credvault token set`.
pub fn execute_set(cli: &Cli, user: &str, kind: TokenKind, value: Option<&str>) -> Result<()> {
    validate_user_id(user)?;
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let plaintext = read_value(value, &format!("Enter {kind} token for {user}"), true)?;
    if plaintext.is_empty() {
        return Err(CredVaultError::CommandFailed(
            "empty token — use `credvault token clear` to remove one".into(),
        ));
    }

    let store = ctx.open_store(&codec, "token-set", user, Some(kind))?;
    let mut service = TokenService::new(&codec, store);
    let result = service.set_token(user, kind, &plaintext);
    ctx.audit("token-set", Some(user), Some(kind), &result);
    result?;

    output::success(&format!("Stored {kind} token for '{user}'."));
    Ok(())
}

/// Execute `credvault token get`.
pub fn execute_get(cli: &Cli, user: &str, kind: TokenKind) -> Result<()> {
    validate_user_id(user)?;
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let store = ctx.open_store(&codec, "token-get", user, Some(kind))?;
    let service = TokenService::new(&codec, store);
    let result = service.get_token(user, kind);
    ctx.audit("token-get", Some(user), Some(kind), &result);

    match result? {
        Some(token) => {
            println!("{}", token.as_str());
            Ok(())
        }
        None => Err(CredVaultError::TokenNotConfigured {
            user_id: user.to_string(),
            kind: kind.to_string(),
        }),
    }
}

/// Execute `credvault token clear`.
pub fn execute_clear(cli: &Cli, user: &str, kind: TokenKind) -> Result<()> {
    validate_user_id(user)?;
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let store = ctx.open_store(&codec, "token-clear", user, Some(kind))?;
    let mut service = TokenService::new(&codec, store);
    let result = service.clear_token(user, kind);
    ctx.audit("token-clear", Some(user), Some(kind), &result);
    result?;

    output::success(&format!("Cleared {kind} token for '{user}'."));
    Ok(())
}

/// Execute `credvault token status`.
pub fn execute_status(cli: &Cli, user: &str) -> Result<()> {
    validate_user_id(user)?;
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let store = ctx.open_store(&codec, "token-status", user, None)?;
    let service = TokenService::new(&codec, store);
    let status = service.token_status(user)?;
    output::print_token_status(&status);

    if !status.deploy && !status.generation {
        output::tip(&format!("Run `credvault token set {user} deploy` to add one."));
    }
    Ok(())
}
