//! Safety-checked file mutation.
//!
//! Every write the workflow makes to a repository file goes through
//! [`write_file`], which backs the file up to a `.bak` sibling, sanitizes and
//! validates the candidate content, and restores the backup if anything goes
//! wrong mid-write. [`revert`] and [`revert_all`] consume those backups.

pub mod revert;
pub mod sanitizer;
pub mod validator;
pub mod writer;

pub use revert::{RevertFailure, RevertReport, revert, revert_all};
pub use sanitizer::{Sanitized, sanitize};
pub use validator::{Diagnostic, DiagnosticKind, Validation, validate};
pub use writer::{MutationOutcome, write_file};

use std::path::{Path, PathBuf};

/// Suffix appended to a file name to form its backup.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Return the backup path for `path`: the same path with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}

/// Syntax family of a file, derived from its name.
///
/// Finer-grained than the inventory category: `.jsx` is markup for the
/// classifier but script for validation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Astro components (partial hydration via `client:*` directives)
    Astro,
    /// JavaScript / TypeScript, including JSX/TSX
    Script,
    /// CSS and preprocessors
    Style,
    /// Plain HTML-like templates
    Markup,
    /// Single-file components (Vue, Svelte)
    Component,
    Other,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "astro" => Dialect::Astro,
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Dialect::Script,
            "css" | "scss" | "sass" | "less" => Dialect::Style,
            "html" | "htm" | "ejs" => Dialect::Markup,
            "vue" | "svelte" => Dialect::Component,
            _ => Dialect::Other,
        }
    }
}
