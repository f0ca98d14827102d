use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::scan::ScanOptions;
use crate::source::RepoLocation;
use crate::uiforge_config::{LoggingSection, UiforgeToml};
use crate::workflow::WorkflowOptions;

/// Environment variable naming a repository to clone.
pub const ENV_REPO_URL: &str = "REPO_URL";
/// Environment variable naming the working-copy directory.
pub const ENV_TARGET_DIR: &str = "TARGET_DIR";
/// Environment variable overriding `generator.command`.
pub const ENV_GENERATOR_CMD: &str = "UIFORGE_GENERATOR_CMD";

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub repo_dir: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub max_targets: Option<usize>,
    pub no_revert: bool,
    pub generator_cmd: Option<String>,
    pub verbose: bool,
    pub yes: bool,
}

/// Runtime configuration for uiforge.
///
/// Layers CLI flags over environment variables over `uiforge.toml` over
/// built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub uiforge_dir: PathBuf,
    pub audit_dir: PathBuf,
    pub log_dir: PathBuf,
    pub generator_cmd: String,
    pub generator_args: Vec<String>,
    pub location: RepoLocation,
    pub workflow: WorkflowOptions,
    pub logging: LoggingSection,
    pub verbose: bool,
    pub yes: bool,
    toml: UiforgeToml,
}

impl Config {
    /// Build the configuration for `project_dir`, reading the process environment.
    pub fn new(project_dir: PathBuf, cli: CliOverrides) -> Result<Self> {
        Self::resolve(project_dir, cli, |key| std::env::var(key).ok())
    }

    /// Build the configuration with an explicit environment lookup.
    pub fn resolve(
        project_dir: PathBuf,
        cli: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let uiforge_dir = project_dir.join(".uiforge");
        let toml = UiforgeToml::load_or_default(&uiforge_dir)?;

        let generator_cmd = cli
            .generator_cmd
            .clone()
            .or_else(|| env(ENV_GENERATOR_CMD).filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| toml.generator.command.clone());
        if generator_cmd.trim().is_empty() {
            bail!("No generator command configured (set generator.command or {ENV_GENERATOR_CMD})");
        }

        let location = resolve_location(&project_dir, &cli, &env, &toml);

        let workflow = WorkflowOptions {
            scan: ScanOptions {
                max_file_size: toml.scan.max_file_size,
                skip_dirs: toml.scan.skip_dirs.clone(),
                exclude: toml.exclude_patterns(),
            },
            max_targets: cli.max_targets.unwrap_or(toml.workflow.max_targets),
            auto_revert: !cli.no_revert && toml.workflow.auto_revert,
        };

        Ok(Self {
            audit_dir: uiforge_dir.join("audit"),
            log_dir: uiforge_dir.join("logs"),
            uiforge_dir,
            project_dir,
            generator_cmd,
            generator_args: toml.generator.args.clone(),
            location,
            workflow,
            logging: toml.logging.clone(),
            verbose: cli.verbose,
            yes: cli.yes,
            toml,
        })
    }

    /// The parsed file layer, before env and CLI overrides.
    pub fn file_config(&self) -> &UiforgeToml {
        &self.toml
    }

    pub fn config_file(&self) -> PathBuf {
        self.uiforge_dir.join(crate::uiforge_config::CONFIG_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("uiforge.log")
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.audit_dir).context("Failed to create audit directory")?;
        std::fs::create_dir_all(&self.log_dir).context("Failed to create log directory")?;
        Ok(())
    }
}

fn resolve_location(
    project_dir: &Path,
    cli: &CliOverrides,
    env: &impl Fn(&str) -> Option<String>,
    toml: &UiforgeToml,
) -> RepoLocation {
    if let Some(path) = &cli.repo_dir {
        return RepoLocation::Local {
            path: absolute(project_dir, path),
        };
    }

    let url = cli
        .repo_url
        .clone()
        .or_else(|| env(ENV_REPO_URL).filter(|v| !v.trim().is_empty()));
    let target_dir = cli
        .target_dir
        .clone()
        .or_else(|| env(ENV_TARGET_DIR).filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .map(|p| absolute(project_dir, &p));

    match (url, target_dir) {
        (Some(url), dest) => {
            let dest = dest.unwrap_or_else(|| {
                absolute(project_dir, &toml.workflow.workspace_dir).join(repo_name(&url))
            });
            RepoLocation::Remote { url, dest }
        }
        (None, Some(path)) => RepoLocation::Local { path },
        (None, None) => RepoLocation::Local {
            path: project_dir.to_path_buf(),
        },
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Directory name for a clone of `url`: the last path segment without `.git`.
fn repo_name(url: &str) -> String {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repo".to_string()
    } else {
        name.to_string()
    }
}
