//! Command-line interface for `issue_tracker`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::{self, Backend, CliOverrides};
use crate::format::{View, render_response};
use crate::logging;

/// `issues` - Project-scoped issue tracker.
#[derive(Parser, Debug)]
#[command(name = "issues")]
#[command(
    author,
    version,
    about = "Project-scoped issue tracker (SQLite + JSONL)",
    long_about = None
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report 400/404/405 instead of 200 for rejected requests
    #[arg(long, global = true)]
    pub strict_status: bool,

    /// Storage backend (overrides config.yaml and ISSUES_BACKEND)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an issues workspace in the current directory
    Init(InitArgs),

    /// Create a new issue
    Create(CreateArgs),

    /// List issues, optionally filtered
    List(ListArgs),

    /// Show one issue
    Show(ShowArgs),

    /// Update an existing issue
    Update(UpdateArgs),

    /// Delete an issue
    Delete(DeleteArgs),

    /// Send a raw request (method + JSON body)
    Request(RequestArgs),

    /// Check workspace health
    Doctor,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Reinitialize even if a store already exists (data is kept)
    #[arg(long)]
    pub force: bool,
}

/// Issue attributes shared by `create` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct IssueFieldArgs {
    /// Issue title
    #[arg(long)]
    pub title: Option<String>,

    /// Issue description
    #[arg(long)]
    pub text: Option<String>,

    /// Reporter name
    #[arg(long)]
    pub created_by: Option<String>,

    /// Assignee name
    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Free-form status note
    #[arg(long)]
    pub status_text: Option<String>,

    /// Open flag: true or false
    #[arg(long, value_name = "BOOL")]
    pub open: Option<String>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    pub project: String,

    #[command(flatten)]
    pub fields: IssueFieldArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project name
    pub project: String,

    /// Equality filter on any attribute (repeatable)
    #[arg(long = "where", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Project name
    pub project: String,

    /// Issue id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Project name
    pub project: String,

    /// Issue id
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub fields: IssueFieldArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Project name
    pub project: String,

    /// Issue id
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// GET, POST, PUT, PATCH or DELETE
    pub method: String,

    /// Project name
    pub project: String,

    /// JSON object body, or `-` to read stdin
    pub body: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            backend: self.backend,
            strict_status: self.strict_status,
        }
    }
}

/// Log file from the workspace config, if a workspace and a valid config
/// exist. Configuration errors surface later when the command resolves it.
fn configured_log_file(overrides: &CliOverrides) -> Option<PathBuf> {
    let issues_dir = config::discover_issues_dir(None).ok()?;
    config::resolve(&issues_dir, overrides).ok()?.log_file
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails, or if the response it produced
/// reports an `error`.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    let log_file = configured_log_file(&overrides);
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let (response, view) = match &cli.command {
        Commands::Init(args) => {
            let cwd = std::env::current_dir()?;
            let issues_dir = commands::init::execute(args, &cwd, &overrides)?;
            if !cli.quiet {
                println!("Initialized issues workspace in {}", issues_dir.display());
            }
            return Ok(());
        }
        Commands::Doctor => {
            let report = commands::doctor::execute(None, &overrides)?;
            commands::doctor::print_report(&report, cli.json)?;
            if !report.ok {
                bail!("workspace check failed");
            }
            return Ok(());
        }
        Commands::Create(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            (commands::create::execute(args, &ctx)?, View::Issue)
        }
        Commands::List(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            (commands::list::execute(args, &ctx)?, View::IssueList)
        }
        Commands::Show(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            (commands::show::execute(args, &ctx)?, View::Issue)
        }
        Commands::Update(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            (commands::update::execute(args, &ctx)?, View::Confirmation)
        }
        Commands::Delete(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            (commands::delete::execute(args, &ctx)?, View::Confirmation)
        }
        Commands::Request(args) => {
            let ctx = config::open_storage_with_cli(None, &overrides)?;
            let response = commands::request::execute(args, &ctx)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if let Some(message) = response.error_message() {
                bail!("{message}");
            }
            return Ok(());
        }
    };

    if let Some(text) = render_response(&response, view, cli.json)? {
        println!("{text}");
    }
    if let Some(message) = response.error_message() {
        bail!("{message}");
    }
    Ok(())
}
