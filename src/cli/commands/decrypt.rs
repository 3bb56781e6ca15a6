//! `credvault decrypt` — decrypt a value produced by `encrypt`.

use crate::cli::{read_value, Cli, Context};
use crate::errors::Result;

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, ciphertext: Option<&str>) -> Result<()> {
    let ctx = Context::load(cli)?;
    let codec = ctx.codec()?;

    let input = read_value(ciphertext, "Ciphertext", false)?;

    let result = codec.decrypt(input.trim());
    ctx.audit("decrypt", None, None, &result);

    println!("{}", result?.as_str());
    Ok(())
}
