//! Tracing setup and the crypto-failure log marker.
//!
//! Cipher failures are logged under their own target with
//! `crypto_failure = true` so they can be told apart from storage or
//! input errors when diagnosing credential problems.

use tracing_subscriber::EnvFilter;

use crate::errors::CredVaultError;

/// Target used for every cipher failure event.
pub const CRYPTO_TARGET: &str = "credvault::crypto";

/// Install the global subscriber.  `RUST_LOG` wins over `log_level`.
///
/// Logs go to stderr so command output on stdout stays pipeable.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={log_level},warn")));

    // A subscriber may already be installed (tests, embedding apps).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Emit the crypto-failure marker for `operation`.
///
/// Only the error is logged; callers must never pass secret material.
pub fn crypto_failure(operation: &str, err: &CredVaultError) {
    tracing::error!(
        target: CRYPTO_TARGET,
        crypto_failure = true,
        operation,
        error = %err,
        "credential crypto failure"
    );
}
