//! Typed error hierarchy for uiforge.
//!
//! Top-level enums cover the subsystems:
//! - `RunError`: fatal workflow errors stored on the run record
//! - `AcquisitionError`: repository clone / open failures
//! - `ClassificationError`: inventory scan failures
//! - `GenerationError`: content/plan generator failures
//! - `MutationError`: per-target failures, from the writer or the content generator
//! - `RevertError`: backup restore failures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Terminal errors that end a run early. Stored on the `RunRecord`, so every
/// variant carries owned, serializable text rather than a source error.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "kebab-case")]
pub enum RunError {
    #[error("Repository acquisition failed: {0}")]
    Acquisition(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Generation failed: {0}")]
    Generation(String),
}

impl RunError {
    /// Stable short code used in audit output.
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Acquisition(_) => "acquisition-error",
            RunError::Classification(_) => "classification-error",
            RunError::Generation(_) => "generation-error",
        }
    }
}

/// Errors from obtaining a working copy of the repository.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("Target directory {path} exists and is not a git checkout")]
    TargetNotEmpty { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Clone task failed: {0}")]
    Task(String),
}

impl From<AcquisitionError> for RunError {
    fn from(err: AcquisitionError) -> Self {
        RunError::Acquisition(err.to_string())
    }
}

/// Errors from scanning a repository for UI files.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Repository directory {path} does not exist")]
    MissingRoot { path: PathBuf },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl From<ClassificationError> for RunError {
    fn from(err: ClassificationError) -> Self {
        RunError::Classification(err.to_string())
    }
}

/// Errors from an external generator (content or plan).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to spawn generator '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator exited with code {exit_code}: {stderr}")]
    NonZeroExit { exit_code: i32, stderr: String },

    #[error("No JSON object found in generator output")]
    NoJson,

    #[error("Malformed generator JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Generator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GenerationError> for RunError {
    fn from(err: GenerationError) -> Self {
        RunError::Generation(err.to_string())
    }
}

/// Stable failure code for a single mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationErrorKind {
    FileNotFound,
    BackupFailed,
    IoError,
    GenerationFailed,
}

impl std::fmt::Display for MutationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationErrorKind::FileNotFound => write!(f, "file-not-found"),
            MutationErrorKind::BackupFailed => write!(f, "backup-failed"),
            MutationErrorKind::IoError => write!(f, "io-error"),
            MutationErrorKind::GenerationFailed => write!(f, "generation-failed"),
        }
    }
}

/// Errors for one mutation target. They never end the run.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("File {path} does not exist")]
    FileNotFound { path: PathBuf },

    #[error("Failed to create backup {backup}: {source}")]
    BackupFailed {
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No content generated for {path}: {source}")]
    Generation {
        path: PathBuf,
        #[source]
        source: GenerationError,
    },
}

impl MutationError {
    pub fn kind(&self) -> MutationErrorKind {
        match self {
            MutationError::FileNotFound { .. } => MutationErrorKind::FileNotFound,
            MutationError::BackupFailed { .. } => MutationErrorKind::BackupFailed,
            MutationError::Io { .. } => MutationErrorKind::IoError,
            MutationError::Generation { .. } => MutationErrorKind::GenerationFailed,
        }
    }
}

/// Errors from restoring a file out of its `.bak` sibling.
#[derive(Debug, Error)]
pub enum RevertError {
    #[error("No backup found for {path}")]
    NoBackup { path: PathBuf },

    #[error("I/O error reverting {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RevertError {
    pub fn code(&self) -> &'static str {
        match self {
            RevertError::NoBackup { .. } => "no-backup",
            RevertError::Io { .. } => "io-error",
        }
    }
}
