//! Age-based rotation of the calling identity's access key.

use crate::cli::keys::{self, CreatedKey};
use crate::cli::CliContext;
use crate::core::credentials_file;
use crate::core::rotation::{self, RotationDecision, RotationPlan};
use anyhow::{bail, Context, Result};
use chrono::Utc;

pub fn run(ctx: &CliContext, dry_run: bool, format: &str) -> Result<()> {
    if format != "table" && format != "json" {
        bail!("Error rotating access key: invalid format: {} (use table|json)", format);
    }
    let keys = ctx
        .service
        .list_keys()
        .context("Error listing access keys")?;
    let plan = rotation::evaluate(&keys, ctx.max_key_age_days, Utc::now());
    tracing::debug!(?plan, "rotation plan");

    if dry_run {
        return print_plan(ctx, &plan, format);
    }
    execute(ctx, &plan)
}

/// Steps run in order; the first failure aborts the rest. Nothing is rolled back.
fn execute(ctx: &CliContext, plan: &RotationPlan) -> Result<()> {
    if let RotationDecision::Block { active } = &plan.decision {
        println!(
            "User has {} access keys and all are active. Please delete one key or make it inactive first to proceed.",
            active.len()
        );
        return Ok(());
    }

    if let Some(stale) = &plan.delete_stale_inactive {
        println!("Deleting old inactive key: {}", stale);
        keys::delete_key(ctx, stale).context("Error deleting stale inactive key")?;
    }

    match &plan.decision {
        RotationDecision::Block { .. } => {}
        RotationDecision::NoActiveKey => {
            println!("No active access key found; nothing to rotate.");
        }
        RotationDecision::NoActionNeeded { active, age_days } => {
            warn_on_credentials_mismatch(ctx, active);
            println!(
                "The active key {} is {} days old (threshold {}); no rotation necessary.",
                active, age_days, ctx.max_key_age_days
            );
        }
        RotationDecision::RotateActive { active, age_days } => {
            warn_on_credentials_mismatch(ctx, active);
            println!(
                "Rotating active key {} ({} days old, threshold {})...",
                active, age_days, ctx.max_key_age_days
            );
            let created = keys::run_create(ctx).context("Error rotating access key")?;
            if let Some(notice) = stale_credentials_notice(&created, active) {
                eprintln!("{}", notice);
            }
            println!("Deleting old active key: {}", active);
            keys::delete_key(ctx, active).with_context(|| {
                format!(
                    "Error deleting old active key {} (new key {} remains)",
                    active, created.id
                )
            })?;
        }
    }
    Ok(())
}

fn print_plan(ctx: &CliContext, plan: &RotationPlan, format: &str) -> Result<()> {
    if format == "json" {
        let json = serde_json::to_string_pretty(plan).context("Error serializing rotation plan")?;
        println!("{}", json);
        return Ok(());
    }
    println!("Plan: rotate (threshold {} days, dry run)", ctx.max_key_age_days);
    for step in plan.steps() {
        println!("  - {}", step);
    }
    if !plan.has_side_effects() {
        println!("  no changes");
    }
    Ok(())
}

/// Warning for a rotation whose new key never reached the credentials file.
fn stale_credentials_notice(created: &CreatedKey, old_key: &str) -> Option<String> {
    if created.credentials_updated.is_some() {
        return None;
    }
    Some(format!(
        "warning: the credentials file was not updated and may still reference {}, which is deleted next. Store new key {} before using this profile again.",
        old_key, created.id
    ))
}

/// The credentials file is not cross-checked by the policy; flag divergence only.
fn warn_on_credentials_mismatch(ctx: &CliContext, active: &str) {
    let warning = match ctx.paths.credentials_file() {
        Ok(path) => credentials_file::key_id_mismatch(&path, active),
        Err(e) => Some(format!("cannot locate credentials file: {}", e)),
    };
    if let Some(warning) = warning {
        tracing::warn!("{}", warning);
    }
}
