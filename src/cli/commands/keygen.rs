//! `credvault keygen` — print a fresh encryption secret.

use std::io::{self, IsTerminal};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::crypto::generate_secret;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;
    let secret = Zeroizing::new(generate_secret());

    println!("{}", secret.as_str());

    if io::stdout().is_terminal() {
        output::tip(&format!(
            "Store it in {} before running encrypt, decrypt or token commands.",
            ctx.settings.key_env
        ));
        output::warning("Changing the key makes existing ciphertexts unreadable.");
    }

    Ok(())
}
