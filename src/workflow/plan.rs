//! Enhancement plan and target selection.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::scan::{FileEntry, Inventory, ScanOptions, classify_file};

fn default_enhancement_type() -> String {
    "enhancement".to_string()
}

/// One file change proposed by the plan generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedModification {
    #[serde(alias = "file")]
    pub path: PathBuf,
    #[serde(default = "default_enhancement_type")]
    pub enhancement_type: String,
    #[serde(default, alias = "changes")]
    pub description: String,
}

/// Plan phase output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancementPlan {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub changes: Vec<serde_json::Value>,
    #[serde(default)]
    pub file_modifications: Vec<PlannedModification>,
}

/// A file selected for mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub entry: FileEntry,
    pub enhancement_type: String,
    pub planned_change: String,
}

/// Why a planned modification did not become a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: &'static str,
}

/// Turn plan entries into targets, in plan order.
///
/// An entry is kept when its path stays inside `repo_dir`, names an existing
/// file, and classifies as a UI file. Entries absent from the inventory are
/// classified on the spot. At most `max_targets` targets are returned.
pub fn select_targets(
    repo_dir: &Path,
    inventory: &Inventory,
    plan: &EnhancementPlan,
    scan_options: &ScanOptions,
    max_targets: usize,
) -> (Vec<Target>, Vec<Skipped>) {
    let mut targets = Vec::new();
    let mut skipped = Vec::new();

    for modification in &plan.file_modifications {
        let skip = |reason| Skipped {
            path: modification.path.clone(),
            reason,
        };
        let Some(rel) = relative_to_repo(repo_dir, &modification.path) else {
            warn!(path = %modification.path.display(), "planned path escapes repository");
            skipped.push(skip("outside repository"));
            continue;
        };
        if !repo_dir.join(&rel).is_file() {
            skipped.push(skip("file does not exist"));
            continue;
        }
        if targets.len() >= max_targets {
            skipped.push(skip("target limit reached"));
            continue;
        }

        let entry = match inventory.find(&rel) {
            Some(entry) => entry.clone(),
            None => match classify_file(repo_dir, &rel, scan_options) {
                Some(entry) => {
                    debug!(path = %rel.display(), aspect = %entry.aspect, "classified planned file");
                    entry
                }
                None => {
                    skipped.push(skip("not a UI file"));
                    continue;
                }
            },
        };

        targets.push(Target {
            entry,
            enhancement_type: modification.enhancement_type.clone(),
            planned_change: modification.description.clone(),
        });
    }

    (targets, skipped)
}

/// Normalize a generator-supplied path to one relative to `repo_dir`.
fn relative_to_repo(repo_dir: &Path, path: &Path) -> Option<PathBuf> {
    let path = if path.is_absolute() {
        path.strip_prefix(repo_dir).ok()?
    } else {
        path
    };
    let mut rel = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (!rel.as_os_str().is_empty()).then_some(rel)
}
