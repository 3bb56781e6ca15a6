//! `credvault encrypt` — encrypt a value with the configured key.

use crate::cli::output;
use crate::cli::{read_value, Cli, Context};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute(cli: &Cli, value: Option<&str>) -> Result<()> {
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let secret = read_value(value, "Value to encrypt", true)?;
    if secret.is_empty() {
        output::warning("Empty value — nothing to encrypt.");
    }

    let result = codec.encrypt(&secret);
    ctx.audit("encrypt", None, None, &result);

    println!("{}", result?);
    Ok(())
}
