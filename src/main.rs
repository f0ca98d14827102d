use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use uiforge::uiforge_config::UiforgeToml;

mod cmd;

#[derive(Parser)]
#[command(name = "uiforge")]
#[command(version, about = "Generator-driven UI enhancement for web repositories")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip the confirmation prompt before files are modified
    #[arg(long, global = true)]
    pub yes: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full enhancement workflow against a repository
    Run {
        /// Use an existing local checkout
        #[arg(long, conflicts_with = "repo_url")]
        repo_dir: Option<PathBuf>,

        /// Clone this repository (overrides REPO_URL)
        #[arg(long)]
        repo_url: Option<String>,

        /// Where to clone or find the repository (overrides TARGET_DIR)
        #[arg(long)]
        target_dir: Option<PathBuf>,

        /// Maximum number of files to modify
        #[arg(long)]
        max_targets: Option<usize>,

        /// Keep files that fail verification instead of restoring their backups
        #[arg(long)]
        no_revert: bool,

        /// Generator command (overrides generator.command)
        #[arg(long)]
        generator: Option<String>,
    },
    /// Classify the UI files of a directory
    Scan {
        /// Directory to scan (defaults to the project directory)
        dir: Option<PathBuf>,

        /// Print the inventory as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check files for delimiter and tag problems
    Verify {
        /// Paths relative to the repository
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        repo_dir: Option<PathBuf>,

        /// Restore backups for files with high-severity syntax issues
        #[arg(long)]
        revert: bool,
    },
    /// Restore files from their .bak backups
    Revert {
        /// Paths relative to the repository
        #[arg(required_unless_present = "last_run", conflicts_with = "last_run")]
        paths: Vec<PathBuf>,

        #[arg(long)]
        repo_dir: Option<PathBuf>,

        /// Revert every file modified by the most recent recorded run
        #[arg(long)]
        last_run: bool,
    },
    /// Inspect recorded runs
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum AuditCommands {
    /// List recorded runs, most recent first
    List,
    /// Show one run by id prefix
    Show {
        id: String,

        /// Print the full run record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default uiforge.toml file
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    init_telemetry(&project_dir);

    match &cli.command {
        Commands::Run {
            repo_dir,
            repo_url,
            target_dir,
            max_targets,
            no_revert,
            generator,
        } => {
            let overrides = uiforge::config::CliOverrides {
                repo_dir: repo_dir.clone(),
                repo_url: repo_url.clone(),
                target_dir: target_dir.clone(),
                max_targets: *max_targets,
                no_revert: *no_revert,
                generator_cmd: generator.clone(),
                verbose: cli.verbose,
                yes: cli.yes,
            };
            cmd::cmd_run(project_dir, overrides).await?;
        }
        Commands::Scan { dir, json } => cmd::cmd_scan(&project_dir, dir.as_deref(), *json)?,
        Commands::Verify {
            paths,
            repo_dir,
            revert,
        } => cmd::cmd_verify(&project_dir, repo_dir.as_deref(), paths, *revert)?,
        Commands::Revert {
            paths,
            repo_dir,
            last_run,
        } => cmd::cmd_revert(&project_dir, repo_dir.as_deref(), paths, *last_run)?,
        Commands::Audit { command } => cmd::cmd_audit(&project_dir, command)?,
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}

/// Install tracing from the `[logging]` section. A broken config file falls
/// back to defaults so `uiforge config validate` can still report it.
fn init_telemetry(project_dir: &std::path::Path) {
    let uiforge_dir = project_dir.join(".uiforge");
    let logging = UiforgeToml::load_or_default(&uiforge_dir)
        .map(|toml| toml.logging)
        .unwrap_or_default();
    let log_file = uiforge_dir.join("logs").join("uiforge.log");
    if let Err(err) = uiforge::telemetry::initialise(&logging, &log_file) {
        eprintln!("warning: {err}");
    }
}
