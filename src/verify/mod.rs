//! Post-mutation verification.
//!
//! Re-reads every successfully mutated file, runs the same delimiter
//! validator the writer uses, and for HTML additionally compares opening and
//! closing tag counts. Hard syntax failures are revertible; the caller decides
//! whether to revert them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::mutation::{RevertReport, revert_all, validate};

static OPENING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*([a-zA-Z0-9_-]+)[^>]*>").unwrap());

static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\s*([a-zA-Z0-9_-]+)\s*>").unwrap());

/// Elements that never take a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// One finding against a mutated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationIssue {
    pub file: PathBuf,
    pub issue: String,
    pub severity: Severity,
    /// Restoring the backup is expected to fix this
    #[serde(default)]
    pub revertible: bool,
}

/// Verify phase output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub issues: Vec<VerificationIssue>,
    /// Files that existed and were checked
    pub verified_files: Vec<PathBuf>,
    #[serde(default)]
    pub reverted: RevertReport,
}

impl VerificationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Distinct paths with a revertible issue, in first-seen order.
    pub fn revertible_paths(&self) -> Vec<PathBuf> {
        let mut seen = BTreeSet::new();
        self.issues
            .iter()
            .filter(|i| i.revertible && seen.insert(i.file.clone()))
            .map(|i| i.file.clone())
            .collect()
    }
}

/// Check each distinct path in `paths` (relative to `repo_dir`).
pub fn verify(repo_dir: &Path, paths: &[PathBuf]) -> VerificationReport {
    let mut report = VerificationReport::default();
    let mut seen = BTreeSet::new();

    for path in paths {
        if !seen.insert(path.clone()) {
            continue;
        }
        let full_path = repo_dir.join(path);
        if !full_path.is_file() {
            report.issues.push(VerificationIssue {
                file: path.clone(),
                issue: "File not found after reported modification".to_string(),
                severity: Severity::High,
                revertible: false,
            });
            continue;
        }
        report.verified_files.push(path.clone());

        let content = match fs::read_to_string(&full_path) {
            Ok(content) => content,
            Err(err) => {
                report.issues.push(VerificationIssue {
                    file: path.clone(),
                    issue: format!("Error checking file: {}", err),
                    severity: Severity::Medium,
                    revertible: false,
                });
                continue;
            }
        };

        let validation = validate(path, &content);
        if !validation.valid
            && let Some(diagnostic) = validation.diagnostic
        {
            // Auto-fixable findings are medium and stay in place.
            let hard = diagnostic.is_hard_error();
            report.issues.push(VerificationIssue {
                file: path.clone(),
                issue: format!("Syntax issue: {}", diagnostic),
                severity: if hard { Severity::High } else { Severity::Medium },
                revertible: hard,
            });
        }

        if is_html(path) {
            let mismatched = tag_imbalances(&content);
            if !mismatched.is_empty() {
                report.issues.push(VerificationIssue {
                    file: path.clone(),
                    issue: format!("HTML tag imbalance: {}", mismatched.join("; ")),
                    severity: Severity::Medium,
                    revertible: false,
                });
            }
        }
    }

    for issue in &report.issues {
        warn!(file = %issue.file.display(), severity = %issue.severity, "{}", issue.issue);
    }
    info!(
        verified = report.verified_files.len(),
        issues = report.issues.len(),
        "verification complete"
    );
    report
}

/// Verify, then revert every path with a revertible issue when `auto_revert` is set.
pub fn verify_and_revert(repo_dir: &Path, paths: &[PathBuf], auto_revert: bool) -> VerificationReport {
    let mut report = verify(repo_dir, paths);
    if auto_revert {
        let targets = report.revertible_paths();
        if !targets.is_empty() {
            report.reverted = revert_all(repo_dir, &targets);
        }
    }
    report
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// Per-tag count mismatches, sorted by tag name.
fn tag_imbalances(content: &str) -> Vec<String> {
    let mut opens: BTreeMap<String, usize> = BTreeMap::new();
    for caps in OPENING_TAG.captures_iter(content) {
        if caps[0].ends_with("/>") {
            continue;
        }
        let tag = caps[1].to_ascii_lowercase();
        if !VOID_TAGS.contains(&tag.as_str()) {
            *opens.entry(tag).or_default() += 1;
        }
    }
    let mut closes: BTreeMap<String, usize> = BTreeMap::new();
    for caps in CLOSING_TAG.captures_iter(content) {
        *closes.entry(caps[1].to_ascii_lowercase()).or_default() += 1;
    }

    opens
        .iter()
        .filter_map(|(tag, open)| {
            let close = closes.get(tag).copied().unwrap_or(0);
            (*open != close).then(|| format!("{} <{}> vs {} </{}>", open, tag, close, tag))
        })
        .collect()
}
