//! UI file discovery and classification.
//!
//! [`scan`] walks a repository, keeps files whose extension maps to a UI
//! [`FileCategory`], and assigns each an [`Aspect`] by weighted keyword
//! scoring over its path and content.

pub mod patterns;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::ClassificationError;
use patterns::{ASPECT_KEYWORDS, COMPOUND_SUFFIXES, DEFAULT_MAX_FILE_SIZE, EXTENSIONS, PATH_WEIGHT};

/// Structural kind of a file, assigned by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Markup,
    Style,
    Script,
    Animation,
    Asset,
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileCategory::Markup => "markup",
            FileCategory::Style => "style",
            FileCategory::Script => "script",
            FileCategory::Animation => "animation",
            FileCategory::Asset => "asset",
        };
        write!(f, "{}", name)
    }
}

/// UI concern a file is mostly about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Theme,
    Animation,
    Layout,
    Component,
    Navigation,
    Performance,
    Other,
}

impl Aspect {
    /// Every aspect in declared order, `Other` last.
    pub const ALL: [Aspect; 7] = [
        Aspect::Theme,
        Aspect::Animation,
        Aspect::Layout,
        Aspect::Component,
        Aspect::Navigation,
        Aspect::Performance,
        Aspect::Other,
    ];
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Aspect::Theme => "theme",
            Aspect::Animation => "animation",
            Aspect::Layout => "layout",
            Aspect::Component => "component",
            Aspect::Navigation => "navigation",
            Aspect::Performance => "performance",
            Aspect::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// One classified UI file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// Lowercased extension including the dot (e.g. ".tsx")
    pub extension: String,
    pub size: u64,
    pub category: FileCategory,
    pub aspect: Aspect,
}

/// Scan settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_file_size: u64,
    /// Directory names pruned from the walk
    pub skip_dirs: Vec<String>,
    /// Glob patterns matched against relative file paths
    pub exclude: Vec<glob::Pattern>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            skip_dirs: vec![".git".to_string(), "node_modules".to_string()],
            exclude: Vec::new(),
        }
    }
}

/// Ordered UI file inventory: grouped by aspect, sorted by path within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub entries: Vec<FileEntry>,
}

/// Counts over an inventory, for prompts and reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_files: usize,
    pub files_by_aspect: BTreeMap<String, usize>,
    pub files_by_extension: BTreeMap<String, usize>,
}

impl Inventory {
    fn from_unordered(mut entries: Vec<FileEntry>) -> Self {
        entries.sort_by(|a, b| a.aspect.cmp(&b.aspect).then_with(|| a.path.cmp(&b.path)));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn by_aspect(&self, aspect: Aspect) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(move |e| e.aspect == aspect)
    }

    pub fn find(&self, path: &Path) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn summary(&self) -> InventorySummary {
        let mut summary = InventorySummary {
            total_files: self.entries.len(),
            ..Default::default()
        };
        for aspect in Aspect::ALL {
            summary
                .files_by_aspect
                .insert(aspect.to_string(), self.by_aspect(aspect).count());
        }
        for entry in &self.entries {
            *summary
                .files_by_extension
                .entry(entry.extension.clone())
                .or_default() += 1;
        }
        summary
    }
}

/// Walk `repo_dir` and classify every UI file.
pub fn scan(repo_dir: &Path, options: &ScanOptions) -> Result<Inventory, ClassificationError> {
    if !repo_dir.is_dir() {
        return Err(ClassificationError::MissingRoot {
            path: repo_dir.to_path_buf(),
        });
    }

    let walker = WalkDir::new(repo_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !options
                    .skip_dirs
                    .iter()
                    .any(|d| e.file_name().to_str() == Some(d.as_str()))
        });

    let mut entries = Vec::new();
    let mut seen = 0usize;
    for item in walker {
        let item = item.map_err(|source| ClassificationError::Walk {
            path: repo_dir.to_path_buf(),
            source,
        })?;
        if !item.file_type().is_file() {
            continue;
        }
        seen += 1;
        let Ok(rel) = item.path().strip_prefix(repo_dir) else {
            continue;
        };
        if let Some(entry) = classify_file(repo_dir, rel, options) {
            entries.push(entry);
        }
    }

    let inventory = Inventory::from_unordered(entries);
    info!(
        files_seen = seen,
        ui_files = inventory.len(),
        root = %repo_dir.display(),
        "scan complete"
    );
    Ok(inventory)
}

/// Classify a single file relative to `repo_dir`.
///
/// Returns `None` when the file is missing, empty, too large, excluded,
/// unreadable, or not a UI file type.
pub fn classify_file(repo_dir: &Path, rel: &Path, options: &ScanOptions) -> Option<FileEntry> {
    let rel_str = normalized(rel);
    if options.exclude.iter().any(|p| p.matches(&rel_str)) {
        debug!(path = %rel_str, "excluded by pattern");
        return None;
    }

    let category = category_for(&rel_str)?;
    let full_path = repo_dir.join(rel);
    let size = fs::metadata(&full_path).ok()?.len();
    if size == 0 || size > options.max_file_size {
        return None;
    }

    let bytes = match fs::read(&full_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %rel_str, error = %err, "skipping unreadable file");
            return None;
        }
    };
    // Binary assets score on their path alone.
    let content = std::str::from_utf8(&bytes).unwrap_or_default();

    Some(FileEntry {
        path: rel.to_path_buf(),
        extension: extension_of(&rel_str),
        size,
        category,
        aspect: score_aspect(&rel_str, content),
    })
}

fn normalized(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

fn category_for(path: &str) -> Option<FileCategory> {
    let lower = path.to_ascii_lowercase();
    if let Some((_, category)) = COMPOUND_SUFFIXES
        .iter()
        .find(|(suffix, _)| lower.ends_with(suffix))
    {
        return Some(*category);
    }
    let ext = extension_of(&lower);
    EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(category, _)| *category)
}

/// Pick the aspect with the strictly highest nonzero weighted score.
fn score_aspect(path: &str, content: &str) -> Aspect {
    let path = path.to_lowercase();
    let content = content.to_lowercase();

    let mut best = Aspect::Other;
    let mut best_score = 0;
    for (aspect, keywords) in ASPECT_KEYWORDS {
        let path_hits = keywords.iter().filter(|kw| path.contains(*kw)).count();
        let content_hits = keywords.iter().filter(|kw| content.contains(*kw)).count();
        let score = path_hits * PATH_WEIGHT + content_hits;
        if score > best_score {
            best = *aspect;
            best_score = score;
        }
    }
    best
}
