//! Optional settings file model.

use crate::constants;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Rotate the active key once it is older than this many days.
    #[serde(default = "default_max_key_age_days")]
    pub max_key_age_days: i64,

    /// Credentials file to update after creating a key.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Append mutating operations to the audit log.
    #[serde(default = "default_audit")]
    pub audit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_key_age_days: default_max_key_age_days(),
            credentials_file: None,
            audit: default_audit(),
        }
    }
}

fn default_max_key_age_days() -> i64 {
    constants::DEFAULT_MAX_KEY_AGE_DAYS
}

fn default_audit() -> bool {
    true
}
