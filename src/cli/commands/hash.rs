//! `credvault hash` / `credvault verify` — one-way digests.
//!
//! Neither command needs the encryption key.

use crate::cli::output;
use crate::cli::read_value;
use crate::crypto::{hash, verify_digest};
use crate::errors::{CredVaultError, Result};

/// Execute the `hash` command.
pub fn execute_hash(value: Option<&str>) -> Result<()> {
    let value = read_value(value, "Value to hash", false)?;
    println!("{}", hash(&value));
    Ok(())
}

/// Execute the `verify` command.
///
/// Exits non-zero when the digest does not match.
pub fn execute_verify(digest: &str, value: Option<&str>) -> Result<()> {
    let value = read_value(value, "Value to verify", false)?;

    if verify_digest(&value, digest) {
        output::success("Digest matches.");
        Ok(())
    } else {
        Err(CredVaultError::CommandFailed(
            "digest does not match".into(),
        ))
    }
}
