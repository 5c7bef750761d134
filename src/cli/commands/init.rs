use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::InitArgs;
use crate::config::{self, CliOverrides, Config, WORKSPACE_DIR};
use crate::error::{Result, TrackerError};

const GITIGNORE: &str = r"# Database
*.db
*.db-shm
*.db-wal

# Logs
*.log
";

/// Execute the init command in `root`.
///
/// Creates `.issues/` with `config.yaml`, `.gitignore` and an empty store
/// for the chosen backend. Returns the workspace directory.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the store exists and `--force` was not
/// given, or an error if files cannot be written.
pub fn execute(args: &InitArgs, root: &Path, overrides: &CliOverrides) -> Result<PathBuf> {
    let issues_dir = root.join(WORKSPACE_DIR);

    let mut settings = Config::default();
    config::apply_env(&mut settings, |key| env::var(key).ok())?;
    let config = Config {
        backend: overrides.backend.unwrap_or(settings.backend),
        ..Config::default()
    };

    let store_path = issues_dir.join(config.backend.file_name());
    if store_path.exists() && !args.force {
        return Err(TrackerError::AlreadyInitialized { path: store_path });
    }
    fs::create_dir_all(&issues_dir)?;

    // Opening creates the file (and applies the schema for SQLite).
    config::open_store(&issues_dir, &config)?;
    if !store_path.exists() {
        fs::write(&store_path, "")?;
    }

    config::write_config(&issues_dir, &config)?;

    let gitignore_path = issues_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE)?;
    }

    tracing::info!(dir = %issues_dir.display(), backend = config.backend.as_str(), "initialized workspace");
    Ok(issues_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;

    #[test]
    fn init_creates_workspace_files() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            backend: Some(Backend::Sqlite),
            ..CliOverrides::default()
        };

        let issues_dir = execute(&InitArgs { force: false }, dir.path(), &overrides).unwrap();

        assert!(issues_dir.join("issues.db").exists());
        assert!(issues_dir.join("config.yaml").exists());
        assert!(issues_dir.join(".gitignore").exists());
        assert_eq!(
            config::load_file_config(&issues_dir).unwrap().backend,
            Backend::Sqlite
        );
    }

    #[test]
    fn init_jsonl_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            backend: Some(Backend::Jsonl),
            ..CliOverrides::default()
        };

        let issues_dir = execute(&InitArgs { force: false }, dir.path(), &overrides).unwrap();

        let jsonl = issues_dir.join("issues.jsonl");
        assert!(jsonl.exists());
        assert_eq!(fs::read_to_string(jsonl).unwrap(), "");
    }

    #[test]
    fn init_twice_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            backend: Some(Backend::Sqlite),
            ..CliOverrides::default()
        };

        execute(&InitArgs { force: false }, dir.path(), &overrides).unwrap();
        let err = execute(&InitArgs { force: false }, dir.path(), &overrides).unwrap_err();
        assert!(matches!(err, TrackerError::AlreadyInitialized { .. }));

        execute(&InitArgs { force: true }, dir.path(), &overrides).unwrap();
    }
}
