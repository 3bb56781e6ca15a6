//! `credvault audit` — display the audit log.
//!
//! Usage:
//!   credvault audit               # show last 50 entries
//!   credvault audit --last 20     # show last 20
//!   credvault audit --since 7d    # entries from last 7 days
//!
//! Requires the `audit-log` feature (on by default).

use chrono::{DateTime, Utc};

use crate::cli::Cli;
use crate::errors::{CredVaultError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    #[cfg(feature = "audit-log")]
    {
        use crate::audit::AuditLog;
        use crate::cli::{output, Context};

        let ctx = Context::load(cli)?;
        let data_dir = ctx.data_dir();
        if !data_dir.is_dir() {
            output::info("No audit entries found.");
            return Ok(());
        }

        let audit = AuditLog::open(&data_dir)
            .ok_or_else(|| CredVaultError::AuditError("failed to open audit database".into()))?;

        let since_dt = since.map(parse_duration).transpose()?;
        let entries = audit.query(last, since_dt)?;

        if entries.is_empty() {
            output::info("No audit entries found.");
            return Ok(());
        }

        print_audit_table(&entries);
        Ok(())
    }

    #[cfg(not(feature = "audit-log"))]
    {
        let _ = (cli, last, since.map(parse_duration));
        Err(CredVaultError::AuditError(
            "audit log not compiled — rebuild with `--features audit-log`".into(),
        ))
    }
}

/// Parse a human-friendly duration string like "7d", "24h", "30m" into
/// the point in time that long ago.
fn parse_duration(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    let (num_str, unit) = if let Some(s) = input.strip_suffix('d') {
        (s, 'd')
    } else if let Some(s) = input.strip_suffix('h') {
        (s, 'h')
    } else if let Some(s) = input.strip_suffix('m') {
        (s, 'm')
    } else {
        return Err(CredVaultError::CommandFailed(format!(
            "invalid duration '{input}' — use format like 7d, 24h, or 30m"
        )));
    };

    let num: i64 = num_str.parse().map_err(|_| {
        CredVaultError::CommandFailed(format!(
            "invalid duration '{input}' — number part is not valid"
        ))
    })?;

    let duration = match unit {
        'd' => chrono::Duration::days(num),
        'h' => chrono::Duration::hours(num),
        _ => chrono::Duration::minutes(num),
    };

    Ok(Utc::now() - duration)
}

#[cfg(feature = "audit-log")]
fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "User", "Token", "Outcome"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.operation.clone(),
            entry.user_id.clone().unwrap_or_else(|| "-".into()),
            entry.token_kind.clone().unwrap_or_else(|| "-".into()),
            colorize_outcome(&entry.outcome),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

#[cfg(feature = "audit-log")]
fn colorize_outcome(outcome: &str) -> String {
    use console::style;

    match outcome {
        crate::audit::OUTCOME_OK => style(outcome).green().to_string(),
        crate::audit::OUTCOME_CRYPTO_FAILURE => style(outcome).red().bold().to_string(),
        _ => style(outcome).yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        let d = Utc::now() - parse_duration("7d").unwrap();
        assert!((d.num_days() - 7).abs() <= 1);

        let h = Utc::now() - parse_duration("24h").unwrap();
        assert!((h.num_hours() - 24).abs() <= 1);

        let m = Utc::now() - parse_duration("30m").unwrap();
        assert!((m.num_minutes() - 30).abs() <= 1);
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("7x").is_err());
        assert!(parse_duration("d").is_err());
    }

    #[cfg(feature = "audit-log")]
    #[test]
    fn colorize_outcome_keeps_text() {
        console::set_colors_enabled(false);
        assert_eq!(colorize_outcome("crypto-failure"), "crypto-failure");
    }
}
