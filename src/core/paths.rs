//! Path resolution for the credentials file, settings, and audit log.

use crate::constants;
use crate::core::error::KeyError;
use nix::unistd::{getuid, User};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Home directory, if it could be resolved.
    pub home: Option<PathBuf>,
    credentials_override: Option<PathBuf>,
    config_override: Option<PathBuf>,
}

impl AppPaths {
    /// Resolve the home directory from the passwd entry, falling back to `$HOME`.
    pub fn resolve(credentials_arg: Option<PathBuf>, config_arg: Option<PathBuf>) -> Self {
        Self {
            home: resolve_home(),
            credentials_override: credentials_arg,
            config_override: config_arg,
        }
    }

    /// Build paths under an explicit home directory.
    pub fn from_home(home: PathBuf) -> Self {
        Self {
            home: Some(home),
            credentials_override: None,
            config_override: None,
        }
    }

    /// Use `path` unless a credentials file was already given explicitly.
    pub fn or_credentials_file(mut self, path: Option<PathBuf>) -> Self {
        if self.credentials_override.is_none() {
            self.credentials_override = path;
        }
        self
    }

    fn home(&self) -> Result<&PathBuf, KeyError> {
        self.home
            .as_ref()
            .ok_or_else(|| KeyError::Config("cannot resolve home directory of current user".into()))
    }

    pub fn credentials_file(&self) -> Result<PathBuf, KeyError> {
        if let Some(path) = &self.credentials_override {
            return Ok(path.clone());
        }
        Ok(self.home()?.join(constants::CREDENTIALS_RELATIVE_PATH))
    }

    pub fn config_dir(&self) -> Result<PathBuf, KeyError> {
        Ok(self.home()?.join(constants::CONFIG_DIR_RELATIVE_PATH))
    }

    pub fn config_file(&self) -> Result<PathBuf, KeyError> {
        if let Some(path) = &self.config_override {
            return Ok(path.clone());
        }
        Ok(self.config_dir()?.join(constants::CONFIG_FILE_NAME))
    }

    pub fn audit_log(&self) -> Result<PathBuf, KeyError> {
        Ok(self.config_dir()?.join(constants::AUDIT_LOG_FILE_NAME))
    }

    pub fn audit_lock(&self) -> Result<PathBuf, KeyError> {
        Ok(self.config_dir()?.join(constants::AUDIT_LOCK_FILE_NAME))
    }
}

fn resolve_home() -> Option<PathBuf> {
    match User::from_uid(getuid()) {
        Ok(Some(user)) if !user.dir.as_os_str().is_empty() => return Some(user.dir),
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "passwd lookup failed"),
    }
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_home() {
        let paths = AppPaths::from_home(PathBuf::from("/home/ops"));
        assert_eq!(
            paths.credentials_file().unwrap(),
            PathBuf::from("/home/ops/.aws/credentials")
        );
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/home/ops/.config/goamet-iam-keys/config.toml")
        );
        assert_eq!(
            paths.audit_log().unwrap(),
            PathBuf::from("/home/ops/.config/goamet-iam-keys/audit.log")
        );
        assert_eq!(
            paths.audit_lock().unwrap(),
            PathBuf::from("/home/ops/.config/goamet-iam-keys/audit.lock")
        );
    }

    #[test]
    fn test_overrides_win() {
        let paths = AppPaths {
            home: None,
            credentials_override: Some(PathBuf::from("/tmp/creds")),
            config_override: Some(PathBuf::from("/tmp/cfg.toml")),
        };
        assert_eq!(paths.credentials_file().unwrap(), PathBuf::from("/tmp/creds"));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/cfg.toml"));
    }

    #[test]
    fn test_settings_credentials_file_is_fallback_only() {
        let paths = AppPaths::from_home(PathBuf::from("/home/ops"))
            .or_credentials_file(Some(PathBuf::from("/srv/creds")));
        assert_eq!(paths.credentials_file().unwrap(), PathBuf::from("/srv/creds"));

        let explicit = AppPaths::resolve(Some(PathBuf::from("/tmp/creds")), None)
            .or_credentials_file(Some(PathBuf::from("/srv/creds")));
        assert_eq!(explicit.credentials_file().unwrap(), PathBuf::from("/tmp/creds"));
    }

    #[test]
    fn test_missing_home_is_config_error() {
        let paths = AppPaths {
            home: None,
            credentials_override: None,
            config_override: None,
        };
        assert!(matches!(paths.credentials_file(), Err(KeyError::Config(_))));
        assert!(matches!(paths.audit_log(), Err(KeyError::Config(_))));
    }
}
