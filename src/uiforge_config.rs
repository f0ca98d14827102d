//! File-based configuration for uiforge.
//!
//! Reads `.uiforge/uiforge.toml`. Every section is optional and falls back to
//! defaults; environment variables and CLI flags are layered on top by
//! [`crate::config::Config`].
//!
//! # Configuration File Format
//!
//! ```toml
//! [generator]
//! command = "claude"
//! args = ["--print"]
//!
//! [scan]
//! max_file_size = 1000000
//! exclude = ["dist/**", "**/*.min.js"]
//! skip_dirs = [".git", "node_modules"]
//!
//! [workflow]
//! max_targets = 10
//! auto_revert = true
//! workspace_dir = ".uiforge/workspace"
//!
//! [logging]
//! filter = "info"
//! format = "compact"
//! file = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scan::patterns::DEFAULT_MAX_FILE_SIZE;
use crate::workflow::DEFAULT_MAX_TARGETS;

/// Name of the config file inside the `.uiforge` directory.
pub const CONFIG_FILE: &str = "uiforge.toml";

/// External generator invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorSection {
    #[serde(default = "default_generator_command")]
    pub command: String,
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,
}

fn default_generator_command() -> String {
    "claude".to_string()
}

fn default_generator_args() -> Vec<String> {
    vec!["--print".to_string()]
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
            args: default_generator_args(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSection {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Glob patterns matched against repository-relative paths
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Directory names never descended into
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_skip_dirs() -> Vec<String> {
    vec![".git".to_string(), "node_modules".to_string()]
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            exclude: Vec::new(),
            skip_dirs: default_skip_dirs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowSection {
    #[serde(default = "default_max_targets")]
    pub max_targets: usize,
    #[serde(default = "default_auto_revert")]
    pub auto_revert: bool,
    /// Where remote repositories are cloned, relative to the project dir
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

fn default_max_targets() -> usize {
    DEFAULT_MAX_TARGETS
}

fn default_auto_revert() -> bool {
    true
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(".uiforge/workspace")
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_targets: default_max_targets(),
            auto_revert: default_auto_revert(),
            workspace_dir: default_workspace_dir(),
        }
    }
}

/// Output format for tracing events.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Write events to `.uiforge/logs/uiforge.log` instead of stderr
    #[serde(default)]
    pub file: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
            file: false,
        }
    }
}

/// The complete uiforge.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiforgeToml {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub workflow: WorkflowSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl UiforgeToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse uiforge.toml")
    }

    /// Load `<uiforge_dir>/uiforge.toml`, or defaults when it does not exist.
    pub fn load_or_default(uiforge_dir: &Path) -> Result<Self> {
        let config_path = uiforge_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize uiforge.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Compiled exclude patterns. Invalid patterns are dropped; see [`Self::validate`].
    pub fn exclude_patterns(&self) -> Vec<glob::Pattern> {
        self.scan
            .exclude
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.generator.command.trim().is_empty() {
            warnings.push("generator.command is empty".to_string());
        }

        if self.scan.max_file_size == 0 {
            warnings.push("scan.max_file_size is 0: every file will be skipped".to_string());
        }

        for pattern in &self.scan.exclude {
            if let Err(err) = glob::Pattern::new(pattern) {
                warnings.push(format!("Invalid exclude pattern '{}': {}", pattern, err));
            }
        }

        if self.workflow.max_targets == 0 {
            warnings.push("workflow.max_targets is 0: no file will be modified".to_string());
        }

        if let Err(err) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            warnings.push(format!(
                "Invalid logging.filter '{}': {}",
                self.logging.filter, err
            ));
        }

        warnings
    }
}
