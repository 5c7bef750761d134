use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway directory to run `issues` in.
pub struct IssuesWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl IssuesWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    pub fn issues_dir(&self) -> PathBuf {
        self.root.join(".issues")
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn command(workspace: &IssuesWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("issues").expect("issues binary");
    cmd.current_dir(&workspace.root)
        .env_remove("ISSUES_BACKEND")
        .env_remove("ISSUES_STRICT_STATUS")
        .env_remove("ISSUES_LOG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

fn finish(output: std::process::Output, label: &str) -> RunOutput {
    let run = RunOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    eprintln!(
        "[{label}] status={:?}\n--- stdout ---\n{}\n--- stderr ---\n{}",
        run.status.code(),
        run.stdout,
        run.stderr
    );
    run
}

pub fn run_issues<I, S>(workspace: &IssuesWorkspace, args: I, label: &str) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = command(workspace).args(args).output().expect("run issues");
    finish(output, label)
}

pub fn run_issues_with_stdin<I, S>(
    workspace: &IssuesWorkspace,
    args: I,
    stdin: &str,
    label: &str,
) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = command(workspace)
        .args(args)
        .write_stdin(stdin.to_string())
        .output()
        .expect("run issues");
    finish(output, label)
}

pub fn run_issues_with_env<I, S>(
    workspace: &IssuesWorkspace,
    args: I,
    env: &[(&str, &str)],
    label: &str,
) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = command(workspace);
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.args(args).output().expect("run issues");
    finish(output, label)
}
