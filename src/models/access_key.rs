//! Access key records as reported by the key-management service.

use crate::core::error::KeyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyStatus {
    Active,
    Inactive,
}

impl KeyStatus {
    /// Parse a user-supplied status, ignoring case.
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(KeyStatus::Active),
            "inactive" => Ok(KeyStatus::Inactive),
            _ => Err(KeyError::InvalidStatus(input.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "Active",
            KeyStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    pub id: String,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
}

impl AccessKey {
    /// Whole days elapsed since creation, truncated.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

/// A freshly created key pair. The secret is only ever returned once.
pub struct NewAccessKey {
    pub id: String,
    pub secret: Zeroizing<String>,
}

impl fmt::Debug for NewAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccessKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
