//! Centralized constants for paths, file markers, and limits.

/// Default rotation threshold in days.
pub const DEFAULT_MAX_KEY_AGE_DAYS: i64 = 30;

/// Credentials file location relative to the home directory.
pub const CREDENTIALS_RELATIVE_PATH: &str = ".aws/credentials";

/// Settings directory relative to the home directory.
pub const CONFIG_DIR_RELATIVE_PATH: &str = ".config/goamet-iam-keys";

/// Settings file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Audit log file name inside the config directory.
pub const AUDIT_LOG_FILE_NAME: &str = "audit.log";

/// Audit lock file name inside the config directory.
pub const AUDIT_LOCK_FILE_NAME: &str = "audit.lock";

/// Line marker for the access key ID in the credentials file.
pub const KEY_ID_MARKER: &str = "aws_access_key_id";

/// Line marker for the secret access key in the credentials file.
pub const SECRET_MARKER: &str = "aws_secret_access_key";

/// Permission mode for the config directory.
pub const CONFIG_DIR_MODE: u32 = 0o700;

/// Permission mode for the audit log.
pub const AUDIT_LOG_MODE: u32 = 0o600;

/// Default number of audit entries shown.
pub const DEFAULT_AUDIT_LIMIT: usize = 50;
