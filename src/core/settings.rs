//! Loading of the optional TOML settings file.

use crate::models::settings::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read settings {}", path.display()))?;
    let settings: Settings = toml::from_str(&content)
        .with_context(|| format!("parse settings {}", path.display()))?;
    if settings.max_key_age_days < 0 {
        anyhow::bail!(
            "parse settings {}: max_key_age_days must not be negative",
            path.display()
        );
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.max_key_age_days, 30);
        assert!(settings.audit);
        assert!(settings.credentials_file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_key_age_days = 90\naudit = false\n").unwrap();
        let settings = load(&path).unwrap();
        assert_eq!(settings.max_key_age_days, 90);
        assert!(!settings.audit);
        assert!(settings.credentials_file.is_none());
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_key_age_days = \"soon\"\n").unwrap();
        assert!(load(&path).is_err());

        fs::write(&path, "max_key_age_days = -1\n").unwrap();
        assert!(load(&path).is_err());
    }
}
