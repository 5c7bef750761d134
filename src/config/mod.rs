//! Configuration management for `issue_tracker`.
//!
//! Configuration is layered, later layers winning:
//! - Built-in defaults
//! - Workspace config (.issues/config.yaml)
//! - Environment variable overrides (`ISSUES_*`)
//! - Command-line overrides

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use issues_core::{InMemoryStore, IssueService, IssueStore, StatusMode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::storage::SqliteStore;

/// Name of the workspace directory.
pub const WORKSPACE_DIR: &str = ".issues";
/// Name of the config file inside the workspace directory.
pub const CONFIG_FILE: &str = "config.yaml";

pub const ENV_BACKEND: &str = "ISSUES_BACKEND";
pub const ENV_STRICT_STATUS: &str = "ISSUES_STRICT_STATUS";
pub const ENV_LOG_FILE: &str = "ISSUES_LOG_FILE";

/// Persistence engine behind the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `SQLite` database file.
    #[default]
    Sqlite,
    /// JSON Lines file loaded into memory.
    Jsonl,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Jsonl => "jsonl",
        }
    }

    /// Store file name inside the workspace directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Sqlite => "issues.db",
            Self::Jsonl => "issues.jsonl",
        }
    }
}

impl FromStr for Backend {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(TrackerError::config(format!("unknown backend '{other}'"))),
        }
    }
}

/// Effective configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    /// Report 400/404 instead of 200 for rejected requests.
    pub strict_status: bool,
    /// JSON log file; relative paths are resolved against the workspace dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    #[must_use]
    pub const fn status_mode(&self) -> StatusMode {
        StatusMode::from_strict(self.strict_status)
    }
}

/// Overrides taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub backend: Option<Backend>,
    /// Only ever turns strict mode on.
    pub strict_status: bool,
}

/// Find the workspace directory by walking up from `start` (or the current
/// directory).
///
/// # Errors
///
/// Returns `NotInitialized` if no ancestor contains a workspace directory.
pub fn discover_issues_dir(start: Option<&Path>) -> Result<PathBuf> {
    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Ok(dunce::canonicalize(&candidate)?);
        }
        if !current.pop() {
            return Err(TrackerError::NotInitialized);
        }
    }
}

/// Read the workspace config file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or invalid YAML.
pub fn load_file_config(issues_dir: &Path) -> Result<Config> {
    let path = issues_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path)?;
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}

/// Write `config` to the workspace config file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_config(issues_dir: &Path, config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    let text = format!("# Issue tracker workspace configuration\n{yaml}");
    fs::write(issues_dir.join(CONFIG_FILE), text)?;
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(TrackerError::config(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// # Errors
///
/// Returns `Config` if a variable holds an invalid value.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_BACKEND) {
        config.backend = value.parse()?;
    }
    if let Some(value) = lookup(ENV_STRICT_STATUS) {
        config.strict_status = parse_bool(ENV_STRICT_STATUS, &value)?;
    }
    if let Some(value) = lookup(ENV_LOG_FILE) {
        config.log_file = if value.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        };
    }
    Ok(())
}

/// Resolve the effective configuration for a workspace.
///
/// # Errors
///
/// Returns an error if any layer is invalid.
pub fn resolve(issues_dir: &Path, cli: &CliOverrides) -> Result<Config> {
    let mut config = load_file_config(issues_dir)?;
    apply_env(&mut config, |key| env::var(key).ok())?;

    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.strict_status {
        config.strict_status = true;
    }

    if let Some(log_file) = config.log_file.take() {
        config.log_file = Some(if log_file.is_absolute() {
            log_file
        } else {
            issues_dir.join(log_file)
        });
    }

    tracing::debug!(?config, dir = %issues_dir.display(), "configuration resolved");
    Ok(config)
}

/// Open the configured store inside `issues_dir`.
///
/// # Errors
///
/// Returns an error if the store file cannot be opened or loaded.
pub fn open_store(issues_dir: &Path, config: &Config) -> Result<Box<dyn IssueStore>> {
    let path = issues_dir.join(config.backend.file_name());
    tracing::debug!(backend = config.backend.as_str(), path = %path.display(), "opening store");
    Ok(match config.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&path)?),
        Backend::Jsonl => Box::new(InMemoryStore::open(&path)?),
    })
}

/// Everything a command needs: the service over the opened store and the
/// configuration it was opened with.
pub struct StorageContext {
    pub service: IssueService<Box<dyn IssueStore>>,
    pub config: Config,
}

/// Discover the workspace, resolve configuration and open the store.
///
/// # Errors
///
/// Returns `NotInitialized` outside a workspace, or any configuration or
/// storage error.
pub fn open_storage_with_cli(start: Option<&Path>, cli: &CliOverrides) -> Result<StorageContext> {
    let issues_dir = discover_issues_dir(start)?;
    let config = resolve(&issues_dir, cli)?;
    let store = open_store(&issues_dir, &config)?;
    Ok(StorageContext {
        service: IssueService::new(store),
        config,
    })
}
