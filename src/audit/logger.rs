use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::workflow::{Phase, RunRecord};

pub struct AuditLogger {
    audit_dir: PathBuf,
}

/// One line of `uiforge audit list`.
#[derive(Debug, Clone)]
pub struct RunListing {
    pub path: PathBuf,
    pub record: RunRecord,
}

impl AuditLogger {
    pub fn new(audit_dir: &Path) -> Self {
        Self {
            audit_dir: audit_dir.to_path_buf(),
        }
    }

    fn runs_dir(&self) -> PathBuf {
        self.audit_dir.join("runs")
    }

    /// Persist a run. Returns the file written.
    pub fn record_run(&self, record: &RunRecord) -> Result<PathBuf> {
        let runs_dir = self.runs_dir();
        fs::create_dir_all(&runs_dir)
            .with_context(|| format!("Failed to create {}", runs_dir.display()))?;

        let filename = format!(
            "{}_{}.json",
            record.started_at.format("%Y-%m-%dT%H-%M-%S"),
            record.short_id()
        );
        let run_file = runs_dir.join(filename);

        let json = serde_json::to_string_pretty(record).context("Failed to serialize run record")?;
        fs::write(&run_file, json).context("Failed to write audit run file")?;
        debug!(path = %run_file.display(), "run recorded");
        Ok(run_file)
    }

    /// Run files, most recent first.
    pub fn list_runs(&self) -> Result<Vec<PathBuf>> {
        let runs_dir = self.runs_dir();
        if !runs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs: Vec<PathBuf> = fs::read_dir(&runs_dir)
            .with_context(|| format!("Failed to read {}", runs_dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();

        runs.sort();
        runs.reverse();
        Ok(runs)
    }

    pub fn load_run(&self, path: &Path) -> Result<RunRecord> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read audit run file {}", path.display()))?;
        let record: RunRecord =
            serde_json::from_str(&content).context("Failed to parse audit run file")?;
        Ok(record)
    }

    /// Every readable run, most recent first. Unparseable files are skipped.
    pub fn listings(&self) -> Result<Vec<RunListing>> {
        Ok(self
            .list_runs()?
            .into_iter()
            .filter_map(|path| {
                let record = self.load_run(&path).ok()?;
                Some(RunListing { path, record })
            })
            .collect())
    }

    /// The most recent readable run.
    pub fn latest_run(&self) -> Result<Option<RunRecord>> {
        Ok(self.listings()?.into_iter().next().map(|l| l.record))
    }

    /// Find a run whose id starts with `prefix`.
    pub fn find_run(&self, prefix: &str) -> Result<Option<RunRecord>> {
        Ok(self
            .listings()?
            .into_iter()
            .map(|l| l.record)
            .find(|r| r.run_id.starts_with(prefix)))
    }
}

impl RunListing {
    /// Compact status word for listings.
    pub fn status(&self) -> &'static str {
        match (&self.record.error, self.record.phase) {
            (Some(_), _) => "failed",
            (None, Phase::Complete) => "complete",
            (None, _) => "incomplete",
        }
    }
}
