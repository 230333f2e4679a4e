//! Append-only, hash-chained audit trail of key lifecycle operations.
//!
//! Entries carry key IDs only, never secrets.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::util::fs as app_fs;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    pub result: AuditResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_hash: Option<String>,
}

/// Location of the log and its lock file.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pub path: PathBuf,
    pub lock: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf, lock: PathBuf) -> Self {
        Self { path, lock }
    }

    /// Append one entry, chaining it to the previous one.
    pub fn record(&self, action: &str, key_id: Option<&str>, error: Option<String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            app_fs::ensure_dir(dir, constants::CONFIG_DIR_MODE)?;
        }
        let _lock = FileLock::exclusive(&self.lock)?;

        let prev_hash = self
            .read(None)?
            .last()
            .and_then(|e| e.entry_hash.clone());

        let mut entry = AuditEntry {
            timestamp: Utc::now(),
            action: action.to_string(),
            actor: detect_actor(),
            key_id: key_id.map(str::to_string),
            result: AuditResult {
                success: error.is_none(),
                error,
            },
            prev_hash,
            entry_hash: None,
        };
        entry.entry_hash = Some(compute_entry_hash(&entry)?);

        let line = serde_json::to_string(&entry).context("serialize audit entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open audit log {}", self.path.display()))?;
        writeln!(file, "{}", line).context("write audit entry")?;
        app_fs::set_permissions(&self.path, constants::AUDIT_LOG_MODE)?;
        Ok(())
    }

    /// Entries in file order, keeping only the last `limit` when given.
    pub fn read(&self, limit: Option<usize>) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)
            .with_context(|| format!("open audit log {}", self.path.display()))?;
        let mut entries = Vec::new();
        let mut malformed = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.context("read audit log line")?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(_) => malformed += 1,
            }
        }
        if malformed > 0 {
            tracing::warn!(malformed, "skipped malformed audit entries");
        }
        if let Some(limit) = limit {
            if entries.len() > limit {
                entries = entries.split_off(entries.len() - limit);
            }
        }
        Ok(entries)
    }

    /// Check the hash chain. Returns (total, errors).
    pub fn verify(&self) -> Result<(usize, Vec<String>)> {
        let entries = self.read(None)?;
        Ok((entries.len(), verify_chain(&entries)))
    }
}

fn detect_actor() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

fn verify_chain(entries: &[AuditEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut prev: Option<&String> = None;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 && entry.prev_hash.as_ref() != prev {
            errors.push(format!("entry {}: prev_hash does not match previous entry", i + 1));
        }
        match (&entry.entry_hash, compute_entry_hash(entry)) {
            (Some(stored), Ok(computed)) if *stored != computed => {
                errors.push(format!("entry {}: entry_hash mismatch (tampered?)", i + 1));
            }
            (None, _) => errors.push(format!("entry {}: missing entry_hash", i + 1)),
            (_, Err(e)) => errors.push(format!("entry {}: cannot compute hash: {}", i + 1, e)),
            _ => {}
        }
        prev = entry.entry_hash.as_ref();
    }
    errors
}

/// SHA-256 over the entry as JSON with sorted keys, `entry_hash` excluded.
fn compute_entry_hash(entry: &AuditEntry) -> Result<String> {
    let mut value = serde_json::to_value(entry).context("serialize for hash")?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("entry_hash");
    }
    // serde_json::Map is a BTreeMap without the preserve_order feature,
    // so object keys serialize sorted.
    let canonical = serde_json::to_string(&value).context("serialize canonical json")?;
    Ok(format!("{:064x}", Sha256::digest(canonical.as_bytes())))
}
