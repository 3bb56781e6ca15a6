//! Colored terminal output helpers.
//!
//! All user-facing messages go through these functions so we get
//! consistent styling across every command.  Command results (ciphertexts,
//! digests, tokens) are printed with plain `println!` by the commands.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::profile::{TokenKind, TokenStatus};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print which tokens a user has configured (never the values).
pub fn print_token_status(status: &TokenStatus) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Token", "Configured"]);

    for kind in TokenKind::ALL {
        let configured = if status.is_configured(kind) {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        };
        table.add_row(vec![kind.to_string(), configured]);
    }

    println!(
        "{}",
        style(format!("Profile '{}'", status.user_id)).bold()
    );
    println!("{table}");
    println!(
        "Onboarding complete: {}   Updated: {}",
        if status.onboarding_complete { "yes" } else { "no" },
        status.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
}
