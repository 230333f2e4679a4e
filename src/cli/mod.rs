//! CLI flags, command resolution, and dispatch.

use crate::constants;
use crate::core::audit_log::AuditLog;
use crate::core::error::KeyError;
use crate::core::key_service::KeyService;
use crate::core::paths::AppPaths;
use crate::core::settings;
use crate::models::settings::Settings;
use crate::util::aws_iam::IamKeyService;
use crate::util::prompt::{Confirmer, TerminalConfirmer};
use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub mod audit;
pub mod keys;
pub mod rotate;

/// Shared context passed to all command handlers.
pub struct CliContext<'a> {
    pub paths: AppPaths,
    pub max_key_age_days: i64,
    pub non_interactive: bool,
    pub audit_enabled: bool,
    pub service: &'a dyn KeyService,
    pub confirmer: &'a dyn Confirmer,
}

impl CliContext<'_> {
    pub fn audit_log(&self) -> Result<AuditLog, KeyError> {
        Ok(AuditLog::new(self.paths.audit_log()?, self.paths.audit_lock()?))
    }

    /// Record the outcome of a service call. Failures only warn.
    pub fn audit<T>(&self, action: &str, key_id: Option<&str>, result: &Result<T, KeyError>) {
        if !self.audit_enabled {
            return;
        }
        let error = result.as_ref().err().map(|e| e.to_string());
        let recorded = self
            .audit_log()
            .map_err(anyhow::Error::from)
            .and_then(|log| log.record(action, key_id, error));
        if let Err(e) = recorded {
            tracing::warn!("audit log failed: {:#}", e);
        }
    }
}

/// Long flags also accepted with a single leading dash (`-rotate`).
const LONG_FLAGS: &[&str] = &[
    "create",
    "accessKey",
    "updateStatus",
    "delete",
    "list",
    "rotate",
    "audit",
    "dry-run",
    "format",
    "limit",
    "max-age-days",
    "credentials-file",
    "config",
    "non-interactive",
    "help",
    "version",
];

/// Rewrite single-dash long flags to the `--` form clap expects.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|s| {
                let rest = s.strip_prefix('-')?;
                if rest.starts_with('-') {
                    return None;
                }
                let name = rest.split('=').next().unwrap_or(rest);
                LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", s)))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

#[derive(Parser, Debug)]
#[command(
    name = "goamet-iam-keys",
    version,
    about = "Access key lifecycle for the calling IAM identity"
)]
pub struct Cli {
    /// Create an access key and offer to write it to the credentials file
    #[arg(long)]
    pub create: bool,

    /// Access key ID, only used together with --updateStatus
    #[arg(long = "accessKey", value_name = "KEY_ID")]
    pub access_key: Option<String>,

    /// Update access key status: active|inactive; requires --accessKey
    #[arg(long = "updateStatus", value_name = "STATUS")]
    pub update_status: Option<String>,

    /// Delete an access key
    #[arg(long, value_name = "KEY_ID")]
    pub delete: Option<String>,

    /// List access key ID, status, creation date
    #[arg(long)]
    pub list: bool,

    /// Rotate the active key if it is older than the age threshold
    #[arg(long)]
    pub rotate: bool,

    /// Show the audit trail and verify its hash chain
    #[arg(long)]
    pub audit: bool,

    /// With --rotate: print the plan, create and delete nothing
    #[arg(long)]
    pub dry_run: bool,

    /// With --list or --rotate --dry-run: output format (table|json)
    #[arg(long, default_value = "table")]
    pub format: String,

    /// With --audit: maximum number of entries to display
    #[arg(long, default_value_t = constants::DEFAULT_AUDIT_LIMIT)]
    pub limit: usize,

    /// Rotation threshold in days (default: settings file, then 30)
    #[arg(
        long,
        env = "GOAMET_IAM_KEYS_MAX_AGE_DAYS",
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub max_age_days: Option<i64>,

    /// Credentials file to update (default: ~/.aws/credentials)
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE", value_name = "PATH")]
    pub credentials_file: Option<PathBuf>,

    /// Settings file (default: ~/.config/goamet-iam-keys/config.toml)
    #[arg(long, env = "GOAMET_IAM_KEYS_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never prompt; the credentials file is left untouched
    #[arg(
        long,
        env = "GOAMET_IAM_KEYS_NON_INTERACTIVE",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub non_interactive: bool,
}

/// The one operation an invocation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create,
    UpdateStatus { key_id: String, status: String },
    Delete { key_id: String },
    List { format: String },
    Rotate { dry_run: bool, format: String },
    Audit { limit: usize },
}

impl Cli {
    /// Pick the command, first match wins in declaration order.
    pub fn command(&self) -> Option<Command> {
        if self.create {
            return Some(Command::Create);
        }
        if let (Some(key_id), Some(status)) = (&self.access_key, &self.update_status) {
            return Some(Command::UpdateStatus {
                key_id: key_id.clone(),
                status: status.clone(),
            });
        }
        if let Some(key_id) = &self.delete {
            return Some(Command::Delete {
                key_id: key_id.clone(),
            });
        }
        if self.list {
            return Some(Command::List {
                format: self.format.clone(),
            });
        }
        if self.rotate {
            return Some(Command::Rotate {
                dry_run: self.dry_run,
                format: self.format.clone(),
            });
        }
        if self.audit {
            return Some(Command::Audit { limit: self.limit });
        }
        None
    }

    pub fn run(self) -> Result<()> {
        let Some(command) = self.command() else {
            println!("Invalid command. Use -h for help.");
            return Ok(());
        };

        let paths = AppPaths::resolve(self.credentials_file, self.config);
        let settings = load_settings(&paths);
        let paths = paths.or_credentials_file(settings.credentials_file.clone());

        let service =
            IamKeyService::from_env().context("Error setting up the key-management client")?;
        let confirmer = TerminalConfirmer;
        let ctx = CliContext {
            paths,
            max_key_age_days: self.max_age_days.unwrap_or(settings.max_key_age_days),
            non_interactive: self.non_interactive,
            audit_enabled: settings.audit,
            service: &service,
            confirmer: &confirmer,
        };

        dispatch(&ctx, command)
    }
}

/// Best-effort: a broken settings file falls back to defaults.
fn load_settings(paths: &AppPaths) -> Settings {
    let path = match paths.config_file() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("no settings file: {}", e);
            return Settings::default();
        }
    };
    match settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("cannot load settings, using defaults: {:#}", e);
            Settings::default()
        }
    }
}

pub fn dispatch(ctx: &CliContext, command: Command) -> Result<()> {
    tracing::debug!(?command, "dispatching");
    match command {
        Command::Create => keys::run_create(ctx).map(|_| ()),
        Command::UpdateStatus { key_id, status } => keys::run_update_status(ctx, &key_id, &status),
        Command::Delete { key_id } => keys::run_delete(ctx, &key_id),
        Command::List { format } => keys::run_list(ctx, &format),
        Command::Rotate { dry_run, format } => rotate::run(ctx, dry_run, &format),
        Command::Audit { limit } => audit::run(ctx, limit),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::path::Path;

    pub fn context<'a>(
        home: &Path,
        service: &'a dyn KeyService,
        confirmer: &'a dyn Confirmer,
    ) -> CliContext<'a> {
        CliContext {
            paths: AppPaths::from_home(home.to_path_buf()),
            max_key_age_days: constants::DEFAULT_MAX_KEY_AGE_DAYS,
            non_interactive: false,
            audit_enabled: false,
            service,
            confirmer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate_cmd(dry_run: bool) -> Command {
        Command::Rotate {
            dry_run,
            format: "table".into(),
        }
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["goamet-iam-keys"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(normalize_args(argv)).unwrap()
    }

    #[test]
    fn test_single_dash_long_flags() {
        let cli = parse(&["-accessKey", "AKIA1", "-updateStatus", "inactive"]);
        assert_eq!(
            cli.command(),
            Some(Command::UpdateStatus {
                key_id: "AKIA1".into(),
                status: "inactive".into()
            })
        );
        assert_eq!(parse(&["-rotate"]).command(), Some(rotate_cmd(false)));
        assert_eq!(
            parse(&["-delete=AKIA2"]).command(),
            Some(Command::Delete {
                key_id: "AKIA2".into()
            })
        );
    }

    #[test]
    fn test_normalize_leaves_values_and_short_flags() {
        let out = normalize_args(["bin", "-h", "--list", "-x", "AKIA-1"]);
        assert_eq!(out, vec!["bin", "-h", "--list", "-x", "AKIA-1"]);
    }

    #[test]
    fn test_first_match_wins() {
        let cli = parse(&["--list", "--create", "--delete", "AKIA1", "--rotate"]);
        assert_eq!(cli.command(), Some(Command::Create));

        let cli = parse(&["--rotate", "--list", "--delete", "AKIA1"]);
        assert_eq!(
            cli.command(),
            Some(Command::Delete {
                key_id: "AKIA1".into()
            })
        );

        let cli = parse(&["--rotate", "--list"]);
        assert_eq!(
            cli.command(),
            Some(Command::List {
                format: "table".into()
            })
        );
    }

    #[test]
    fn test_access_key_requires_update_status() {
        assert_eq!(parse(&["--accessKey", "AKIA1"]).command(), None);
        assert_eq!(parse(&["--updateStatus", "active"]).command(), None);
        assert_eq!(
            parse(&["--accessKey", "AKIA1", "--rotate"]).command(),
            Some(rotate_cmd(false))
        );
    }

    #[test]
    fn test_no_flags_is_no_command() {
        assert_eq!(parse(&[]).command(), None);
    }

    #[test]
    fn test_rotate_options() {
        let cli = parse(&["-rotate", "-dry-run", "--max-age-days", "45"]);
        assert_eq!(cli.command(), Some(rotate_cmd(true)));
        assert_eq!(cli.max_age_days, Some(45));
    }

    #[test]
    fn test_negative_max_age_rejected() {
        let argv = normalize_args(["bin", "--rotate", "--max-age-days", "-1"]);
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_rotate_json_dry_run() {
        let cli = parse(&["-rotate", "-dry-run", "-format", "json"]);
        assert_eq!(
            cli.command(),
            Some(Command::Rotate {
                dry_run: true,
                format: "json".into()
            })
        );
    }

    #[test]
    fn test_non_interactive_env_accepts_boolish_values() {
        const VAR: &str = "GOAMET_IAM_KEYS_NON_INTERACTIVE";
        for (value, expected) in [
            ("1", true),
            ("yes", true),
            ("true", true),
            ("on", true),
            ("0", false),
            ("no", false),
            ("false", false),
            ("off", false),
        ] {
            std::env::set_var(VAR, value);
            let parsed = Cli::try_parse_from(["goamet-iam-keys", "--list"]);
            std::env::remove_var(VAR);
            let cli = parsed.unwrap_or_else(|e| panic!("{}={} rejected: {}", VAR, value, e));
            assert_eq!(cli.non_interactive, expected, "{}={}", VAR, value);
        }
        assert!(parse(&["--non-interactive"]).non_interactive);
    }
}
