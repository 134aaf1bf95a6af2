//! Daemon configuration.
//!
//! Layering, highest priority first:
//!   1. CLI flags / environment — passed in as `Some(value)` from clap
//!   2. TOML file (`--config`, or `./reviewd.toml` when present)
//!   3. Built-in defaults
//!
//! An explicitly passed `--config` path must load cleanly; the implicit
//! default path is best-effort (a parse error is logged and defaults win).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

pub const DEFAULT_PORT: u16 = 4400;
const DEFAULT_CONFIG_FILE: &str = "reviewd.toml";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ─── GitLabConfig ─────────────────────────────────────────────────────────────

/// GitLab API access (`[gitlab]` in reviewd.toml).
///
/// An empty `base_url` disables the client: file lookups answer empty and
/// comment posts are skipped.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// Base URL of the GitLab instance, e.g. `"https://gitlab.example.com"`.
    pub base_url: String,
    /// Personal/project access token sent as `PRIVATE-TOKEN`.
    pub api_token: String,
    /// Per-request timeout in seconds. Default: 10.
    pub timeout_secs: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// ─── JiraConfig ───────────────────────────────────────────────────────────────

/// Jira API access (`[jira]` in reviewd.toml). Empty `base_url` disables the
/// lookup; the pipeline then runs with empty issue contexts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira instance, e.g. `"https://company.atlassian.net"`.
    pub base_url: String,
    /// User for HTTP basic auth (usually an email address).
    pub username: String,
    /// API token paired with `username`.
    pub api_token: String,
    /// Per-request timeout in seconds. Default: 10.
    pub timeout_secs: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            api_token: String::new(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

// ─── NotifyConfig ─────────────────────────────────────────────────────────────

/// Admin email notification settings (`[notify]` in reviewd.toml).
/// An empty `admin_email` disables notifications.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub smtp_host: String,
    /// SMTP submission port. Default: 465 (implicit TLS).
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Recipient of failure notifications.
    pub admin_email: String,
    /// Sender address. Falls back to a local placeholder when empty.
    pub from_email: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 465,
            smtp_username: String::new(),
            smtp_password: String::new(),
            admin_email: String::new(),
            from_email: String::new(),
        }
    }
}

// ─── TOML file shape ──────────────────────────────────────────────────────────

/// Everything that may appear in the TOML file. All fields optional so a
/// partial file overrides only what it names.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    bind_address: Option<String>,
    port: Option<u16>,
    log: Option<String>,
    log_file: Option<PathBuf>,
    log_format: Option<String>,
    gitlab: Option<GitLabConfig>,
    jira: Option<JiraConfig>,
    notify: Option<NotifyConfig>,
}

// ─── ReviewdConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ReviewdConfig {
    pub bind_address: String,
    pub port: u16,
    /// Log level filter (trace, debug, info, warn, error).
    pub log: String,
    /// Optional log file path (rotated daily).
    pub log_file: Option<PathBuf>,
    /// "pretty" or "json".
    pub log_format: String,
    pub gitlab: GitLabConfig,
    pub jira: JiraConfig,
    pub notify: NotifyConfig,
}

impl Default for ReviewdConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: DEFAULT_PORT,
            log: "info".to_string(),
            log_file: None,
            log_format: "pretty".to_string(),
            gitlab: GitLabConfig::default(),
            jira: JiraConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl ReviewdConfig {
    /// Build the effective config from CLI/env overrides plus the TOML file.
    pub fn load(
        config_path: Option<&Path>,
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        log_file: Option<PathBuf>,
        log_format: Option<String>,
    ) -> Result<Self, ConfigError> {
        let toml = match config_path {
            Some(path) => read_toml(path)?,
            None => load_default_toml(),
        };

        let mut gitlab = toml.gitlab.unwrap_or_default();
        if let Ok(url) = std::env::var("REVIEWD_GITLAB_URL") {
            if !url.is_empty() {
                gitlab.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("REVIEWD_GITLAB_TOKEN") {
            if !token.is_empty() {
                gitlab.api_token = token;
            }
        }

        let mut jira = toml.jira.unwrap_or_default();
        if let Ok(url) = std::env::var("REVIEWD_JIRA_URL") {
            if !url.is_empty() {
                jira.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("REVIEWD_JIRA_TOKEN") {
            if !token.is_empty() {
                jira.api_token = token;
            }
        }

        Ok(Self {
            bind_address: bind_address
                .filter(|s| !s.is_empty())
                .or(toml.bind_address)
                .unwrap_or_else(default_bind_address),
            port: port.or(toml.port).unwrap_or(DEFAULT_PORT),
            log: log.or(toml.log).unwrap_or_else(|| "info".to_string()),
            log_file: log_file.or(toml.log_file),
            log_format: log_format
                .or(toml.log_format)
                .unwrap_or_else(|| "pretty".to_string()),
            gitlab,
            jira,
            notify: toml.notify.unwrap_or_default(),
        })
    }
}

/// Load an explicitly named config file. Errors are surfaced to the caller —
/// a bad `--config` should stop startup, not silently run with defaults.
fn read_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `./reviewd.toml` when it exists. A missing file is normal; a broken
/// one is logged and ignored.
fn load_default_toml() -> TomlConfig {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    let Ok(contents) = std::fs::read_to_string(path) else {
        return TomlConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            error!(path = %path.display(), err = %err, "failed to parse reviewd.toml — using defaults");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults_without_any_input() {
        let config = ReviewdConfig::load(None, None, None, None, None, None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log, "info");
        assert!(config.gitlab.base_url.is_empty());
        assert_eq!(config.notify.smtp_port, 465);
    }

    #[test]
    fn test_toml_file_overrides_defaults_and_cli_overrides_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
port = 9000
log = "debug"

[gitlab]
base_url = "https://gitlab.example.com"
api_token = "secret"

[notify]
admin_email = "admin@example.com"
"#
        )
        .unwrap();

        let config =
            ReviewdConfig::load(Some(file.path()), Some(9100), None, None, None, None).unwrap();

        assert_eq!(config.port, 9100, "CLI wins over TOML");
        assert_eq!(config.log, "debug");
        assert_eq!(config.gitlab.base_url, "https://gitlab.example.com");
        assert_eq!(config.gitlab.timeout_secs, 10, "section defaults fill gaps");
        assert_eq!(config.notify.admin_email, "admin@example.com");
    }

    #[test]
    fn test_explicit_config_path_must_parse() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not toml [").unwrap();

        let err =
            ReviewdConfig::load(Some(file.path()), None, None, None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_explicit_config_path_errors() {
        let err = ReviewdConfig::load(
            Some(Path::new("/nonexistent/reviewd.toml")),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
