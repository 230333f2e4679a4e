use crate::cli::CliContext;
use crate::core::credentials_file;
use crate::models::access_key::{AccessKey, KeyStatus};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;
use std::path::PathBuf;

const UPDATE_PROMPT: &str =
    "Update credentials file with new key? Warning: File contents will be overwritten!";

/// Result of the create workflow.
#[derive(Debug)]
pub struct CreatedKey {
    pub id: String,
    /// Set when the credentials file was rewritten.
    pub credentials_updated: Option<PathBuf>,
}

#[derive(Serialize)]
struct ListItem<'a> {
    id: &'a str,
    status: KeyStatus,
    created_at: DateTime<Utc>,
    age_days: i64,
}

/// Create a key, show it, and offer to write it to the credentials file.
///
/// Declining (or non-interactive mode) still reports the new key: it exists
/// on the service either way.
pub fn run_create(ctx: &CliContext) -> Result<CreatedKey> {
    let result = ctx.service.create_key();
    ctx.audit(
        "create",
        result.as_ref().ok().map(|k| k.id.as_str()),
        &result,
    );
    let key = result.context("Error creating access key")?;

    println!("New Key:        {}", key.id);
    println!("Secret:         {}", key.secret.as_str());
    println!();

    let confirmed = if ctx.non_interactive {
        println!("Non-interactive mode: credentials file left unchanged.");
        false
    } else {
        match ctx.confirmer.confirm(UPDATE_PROMPT) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("no confirmation, leaving credentials file unchanged: {:#}", e);
                false
            }
        }
    };

    if !confirmed {
        println!("Credentials file left unchanged; new key {} is active.", key.id);
        return Ok(CreatedKey {
            id: key.id,
            credentials_updated: None,
        });
    }

    let path = ctx
        .paths
        .credentials_file()
        .with_context(|| format!("Error updating credentials file (new key {} was created)", key.id))?;
    credentials_file::update(&path, &key.id, &key.secret)
        .with_context(|| format!("Error updating credentials file (new key {} was created)", key.id))?;

    println!("Updated credentials file at {}", path.display());
    Ok(CreatedKey {
        id: key.id,
        credentials_updated: Some(path),
    })
}

pub fn run_update_status(ctx: &CliContext, key_id: &str, status: &str) -> Result<()> {
    let status = KeyStatus::parse(status).context("Error updating access key")?;
    let result = ctx.service.set_key_status(key_id, status);
    ctx.audit(
        &format!("update-status:{}", status.as_str().to_lowercase()),
        Some(key_id),
        &result,
    );
    result.context("Error updating access key")?;
    println!("Access key {} updated to {} status", key_id, status);
    Ok(())
}

pub fn run_delete(ctx: &CliContext, key_id: &str) -> Result<()> {
    delete_key(ctx, key_id).context("Error deleting access key")
}

/// Audited delete shared with rotation.
pub(crate) fn delete_key(ctx: &CliContext, key_id: &str) -> Result<()> {
    let result = ctx.service.delete_key(key_id);
    ctx.audit("delete", Some(key_id), &result);
    result?;
    println!("Access key {} has been deleted!", key_id);
    Ok(())
}

pub fn run_list(ctx: &CliContext, format: &str) -> Result<()> {
    if format != "table" && format != "json" {
        bail!("Error listing access keys: invalid format: {} (use table|json)", format);
    }
    let keys = ctx
        .service
        .list_keys()
        .context("Error listing access keys")?;
    let now = Utc::now();

    if format == "json" {
        let items: Vec<ListItem> = keys.iter().map(|k| list_item(k, now)).collect();
        let json = serde_json::to_string_pretty(&items).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if keys.is_empty() {
        println!("No access keys found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("Created").add_attribute(Attribute::Bold),
        Cell::new("Age (days)").add_attribute(Attribute::Bold),
    ]);
    for key in &keys {
        table.add_row(vec![
            key.id.clone(),
            key.status.to_string(),
            key.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            key.age_days(now).to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}

fn list_item(key: &AccessKey, now: DateTime<Utc>) -> ListItem<'_> {
    ListItem {
        id: &key.id,
        status: key.status,
        created_at: key.created_at,
        age_days: key.age_days(now),
    }
}
