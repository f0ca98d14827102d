//! The run record threaded through every phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::plan::{EnhancementPlan, Target};
use crate::analysis::Analysis;
use crate::errors::RunError;
use crate::mutation::MutationOutcome;
use crate::scan::Inventory;
use crate::source::RepoLocation;
use crate::verify::{Severity, VerificationReport};

/// Stage of a run. Advances in declaration order; `Mutate` repeats once per
/// target and any stage may jump to `Complete` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Discover,
    Classify,
    Analyze,
    Plan,
    Mutate,
    Verify,
    Summarize,
    Complete,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self == Phase::Complete
    }

    /// Short description for progress output.
    pub fn description(self) -> &'static str {
        match self {
            Phase::Discover => "acquiring repository",
            Phase::Classify => "classifying UI files",
            Phase::Analyze => "analyzing capabilities",
            Phase::Plan => "planning enhancements",
            Phase::Mutate => "applying changes",
            Phase::Verify => "verifying changes",
            Phase::Summarize => "summarizing",
            Phase::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Discover => "discover",
            Phase::Classify => "classify",
            Phase::Analyze => "analyze",
            Phase::Plan => "plan",
            Phase::Mutate => "mutate",
            Phase::Verify => "verify",
            Phase::Summarize => "summarize",
            Phase::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub targets: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub content_discarded: usize,
    pub reverted: usize,
    pub high_issues: usize,
    pub medium_issues: usize,
}

impl RunSummary {
    pub fn from_record(record: &RunRecord) -> Self {
        let succeeded = record.results.iter().filter(|r| r.success).count();
        let verification = record.verification.as_ref();
        Self {
            targets: record.targets.len(),
            succeeded,
            failed: record.results.len() - succeeded,
            content_discarded: record
                .results
                .iter()
                .filter(|r| r.content_discarded)
                .count(),
            reverted: verification.map_or(0, |v| v.reverted.reverted.len()),
            high_issues: verification.map_or(0, |v| v.count(Severity::High)),
            medium_issues: verification.map_or(0, |v| v.count(Severity::Medium)),
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} target(s): {} succeeded, {} failed, {} kept original content, {} reverted; \
             {} high / {} medium verification issue(s)",
            self.targets,
            self.succeeded,
            self.failed,
            self.content_discarded,
            self.reverted,
            self.high_issues,
            self.medium_issues
        )
    }
}

/// Complete state of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub location: RepoLocation,
    pub phase: Phase,
    /// Absolute working-copy path, set once by Discover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_dir: Option<PathBuf>,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<EnhancementPlan>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub cursor: usize,
    #[serde(default)]
    pub results: Vec<MutationOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    #[serde(default)]
    pub audit_log: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}

impl RunRecord {
    pub fn new(location: RepoLocation) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ended_at: None,
            location,
            phase: Phase::Discover,
            repo_dir: None,
            inventory: Inventory::default(),
            analysis: None,
            plan: None,
            targets: Vec::new(),
            cursor: 0,
            results: Vec::new(),
            verification: None,
            summary: None,
            audit_log: Vec::new(),
            error: None,
        }
    }

    /// First eight characters of the run id.
    pub fn short_id(&self) -> &str {
        &self.run_id[..8.min(self.run_id.len())]
    }

    /// Upper bound on transitions for this record's target list.
    pub fn step_bound(&self) -> usize {
        6 + self.targets.len()
    }

    /// Distinct successfully mutated paths, in attempt order.
    pub fn mutated_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for result in self.results.iter().filter(|r| r.success) {
            if !paths.contains(&result.path) {
                paths.push(result.path.clone());
            }
        }
        paths
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.audit_log.push(line.into());
    }

    /// Record a terminal error and jump to `Complete`.
    pub fn fail(&mut self, error: RunError) {
        self.log(format!("[{}] {}", self.phase, error));
        self.error = Some(error);
        self.phase = Phase::Complete;
    }
}
