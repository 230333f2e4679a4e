use crate::cli::CliContext;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

pub fn run(ctx: &CliContext, limit: usize) -> Result<()> {
    let log = ctx.audit_log().context("Error reading audit log")?;
    let entries = log.read(Some(limit)).context("Error reading audit log")?;

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new("Action").add_attribute(Attribute::Bold),
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Actor").add_attribute(Attribute::Bold),
        Cell::new("Result").add_attribute(Attribute::Bold),
    ]);

    for entry in &entries {
        let local: DateTime<Local> = entry.timestamp.into();
        let result = if entry.result.success {
            "OK".to_string()
        } else {
            format!("FAIL: {}", entry.result.error.as_deref().unwrap_or("?"))
        };
        table.add_row(vec![
            local.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.action.clone(),
            entry.key_id.clone().unwrap_or_else(|| "-".to_string()),
            entry.actor.clone(),
            result,
        ]);
    }

    println!("{}", table);
    println!("\n{} entries shown.", entries.len());

    let (total, errors) = log.verify().context("Error verifying audit log")?;
    if errors.is_empty() {
        println!("Audit chain OK ({} entries).", total);
        return Ok(());
    }
    for err in &errors {
        println!("  [FAIL] {}", err);
    }
    bail!(
        "Error verifying audit log: {} problem(s) in {} entries",
        errors.len(),
        total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::context;
    use crate::core::key_service::fake::FakeKeyService;
    use crate::util::prompt::CannedAnswer;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_log() {
        let home = TempDir::new().unwrap();
        let svc = FakeKeyService::default();
        let no = CannedAnswer(false);
        let ctx = context(home.path(), &svc, &no);
        run(&ctx, 10).unwrap();
    }

    #[test]
    fn test_tampered_log_fails() {
        let home = TempDir::new().unwrap();
        let svc = FakeKeyService::default();
        let no = CannedAnswer(false);
        let ctx = context(home.path(), &svc, &no);
        let log = ctx.audit_log().unwrap();
        log.record("create", Some("AKIA1"), None).unwrap();
        log.record("delete", Some("AKIA0"), None).unwrap();
        run(&ctx, 10).unwrap();

        let content = fs::read_to_string(&log.path).unwrap();
        fs::write(&log.path, content.replace("delete", "create")).unwrap();
        assert!(run(&ctx, 10).is_err());
    }
}
