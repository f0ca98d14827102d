//! The safety-checked writer.
//!
//! Protocol for one file: backup, read original, sanitize the candidate,
//! validate (one auto-fix attempt, then fall back to the original), write.
//! An empty candidate writes the original back untouched. Any failure after
//! the backup exists restores the file from it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Dialect, backup_path, sanitize, validate};
use crate::errors::{MutationError, MutationErrorKind};

/// Record of one mutation attempt. Built by [`write_file`], recorded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Path relative to the repository root
    pub path: PathBuf,
    pub enhancement_type: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MutationErrorKind>,
    /// Human-readable error detail, including any failed restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Backup location relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    /// The sanitizer changed the generated content
    #[serde(default)]
    pub sanitized: bool,
    /// Generated content failed validation and the original was kept
    #[serde(default)]
    pub content_discarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub written_sha256: Option<String>,
}

impl MutationOutcome {
    /// Build a failed outcome from a writer error.
    pub fn failure(path: &Path, enhancement_type: &str, err: &MutationError) -> Self {
        Self {
            path: path.to_path_buf(),
            enhancement_type: enhancement_type.to_string(),
            success: false,
            error: Some(err.kind()),
            detail: Some(err.to_string()),
            backup_path: None,
            sanitized: false,
            content_discarded: false,
            original_sha256: None,
            written_sha256: None,
        }
    }

    /// Whether the bytes on disk differ from the pre-call content.
    pub fn changed_file(&self) -> bool {
        self.success && self.original_sha256 != self.written_sha256
    }
}

struct Applied {
    sanitized: bool,
    content_discarded: bool,
    original_sha256: String,
    written_sha256: String,
}

/// Apply `new_content` to `repo_dir/path` under the backup/validate/restore protocol.
///
/// Never panics and never returns an error: every outcome, including failure,
/// is described by the returned [`MutationOutcome`]. An empty `new_content`
/// leaves the file byte-for-byte as it was. Paths that leave `repo_dir`
/// are reported as `file-not-found`.
pub fn write_file(
    repo_dir: &Path,
    path: &Path,
    enhancement_type: &str,
    new_content: &str,
) -> MutationOutcome {
    let full_path = repo_dir.join(path);
    if !stays_inside(path) {
        warn!(path = %path.display(), "mutation target is outside the repository");
        let err = MutationError::FileNotFound { path: full_path };
        return MutationOutcome::failure(path, enhancement_type, &err);
    }
    if !full_path.is_file() {
        warn!(path = %path.display(), "mutation target does not exist");
        let err = MutationError::FileNotFound { path: full_path };
        return MutationOutcome::failure(path, enhancement_type, &err);
    }

    let backup = backup_path(&full_path);
    if let Err(source) = fs::copy(&full_path, &backup) {
        warn!(path = %path.display(), error = %source, "failed to create backup");
        let err = MutationError::BackupFailed { backup, source };
        return MutationOutcome::failure(path, enhancement_type, &err);
    }
    debug!(backup = %backup.display(), "backup created");

    match apply(&full_path, new_content) {
        Ok(applied) => {
            info!(
                path = %path.display(),
                enhancement = enhancement_type,
                sanitized = applied.sanitized,
                content_discarded = applied.content_discarded,
                "file written"
            );
            MutationOutcome {
                path: path.to_path_buf(),
                enhancement_type: enhancement_type.to_string(),
                success: true,
                error: None,
                detail: None,
                backup_path: Some(backup_path(path)),
                sanitized: applied.sanitized,
                content_discarded: applied.content_discarded,
                original_sha256: Some(applied.original_sha256),
                written_sha256: Some(applied.written_sha256),
            }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "mutation failed, restoring backup");
            let mut outcome = MutationOutcome::failure(path, enhancement_type, &err);
            if let Err(restore_err) = fs::copy(&backup, &full_path) {
                warn!(path = %path.display(), error = %restore_err, "restore from backup failed");
                outcome.detail = Some(format!(
                    "{}; restore from backup failed: {}",
                    err, restore_err
                ));
            }
            outcome
        }
    }
}

fn apply(full_path: &Path, new_content: &str) -> Result<Applied, MutationError> {
    let original = fs::read_to_string(full_path).map_err(|source| MutationError::Io {
        path: full_path.to_path_buf(),
        source,
    })?;

    if new_content.is_empty() {
        debug!(path = %full_path.display(), "no generated content, keeping original");
        fs::write(full_path, &original).map_err(|source| MutationError::Io {
            path: full_path.to_path_buf(),
            source,
        })?;
        let digest = fingerprint(&original);
        return Ok(Applied {
            sanitized: false,
            content_discarded: false,
            original_sha256: digest.clone(),
            written_sha256: digest,
        });
    }

    let sanitized = sanitize(Dialect::from_path(full_path), new_content);
    if sanitized.changed {
        info!(path = %full_path.display(), "sanitizer removed invalid constructs");
    }

    let (content, fell_back) = settle(full_path, sanitized.content, &original);

    fs::write(full_path, &content).map_err(|source| MutationError::Io {
        path: full_path.to_path_buf(),
        source,
    })?;

    Ok(Applied {
        sanitized: sanitized.changed,
        content_discarded: fell_back,
        original_sha256: fingerprint(&original),
        written_sha256: fingerprint(&content),
    })
}

/// Validate the candidate, adopting one auto-fix if offered.
/// Falls back to `original` when the candidate is still invalid; the flag reports that.
fn settle(path: &Path, candidate: String, original: &str) -> (String, bool) {
    let first = validate(path, &candidate);
    if first.valid {
        return (candidate, false);
    }

    if first.has_fix() {
        if let Some(diag) = &first.diagnostic {
            info!(path = %path.display(), diagnostic = %diag, "adopting auto-fix");
        }
        let second = validate(path, &first.content);
        if second.valid {
            return (first.content, false);
        }
    }

    if let Some(diag) = &first.diagnostic {
        warn!(
            path = %path.display(),
            diagnostic = %diag,
            "content failed validation, keeping original"
        );
    }
    (original.to_string(), true)
}

/// Relative, with no `..`, root or drive prefix.
fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn fingerprint(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn repo_with(path: &str, content: &[u8]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
        dir
    }

    #[test]
    fn test_valid_content_written_with_backup() {
        let dir = repo_with("src/theme.css", b".a { color: red; }\n");
        let outcome = write_file(
            dir.path(),
            Path::new("src/theme.css"),
            "theme",
            ".a { color: blue; }\n",
        );

        assert!(outcome.success);
        assert_eq!(outcome.backup_path, Some(PathBuf::from("src/theme.css.bak")));
        assert!(!outcome.content_discarded);
        assert!(outcome.changed_file());
        assert_eq!(
            fs::read_to_string(dir.path().join("src/theme.css")).unwrap(),
            ".a { color: blue; }\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("src/theme.css.bak")).unwrap(),
            ".a { color: red; }\n"
        );
    }

    #[test]
    fn test_empty_content_is_a_noop_with_backup() {
        let original = b"export const Button = () => <button>Go</button>;\n";
        let dir = repo_with("Button.jsx", original);
        let outcome = write_file(dir.path(), Path::new("Button.jsx"), "component", "");

        assert!(outcome.success);
        assert!(!outcome.changed_file());
        assert!(!outcome.content_discarded);
        assert_eq!(fs::read(dir.path().join("Button.jsx")).unwrap(), original);
        assert_eq!(fs::read(dir.path().join("Button.jsx.bak")).unwrap(), original);
    }

    #[test]
    fn test_empty_content_keeps_astro_directive() {
        let original = b"<Counter client:load />\n";
        let dir = repo_with("Hero.astro", original);
        let outcome = write_file(dir.path(), Path::new("Hero.astro"), "theme", "");

        assert!(outcome.success);
        assert!(!outcome.sanitized);
        assert!(!outcome.changed_file());
        assert_eq!(fs::read(dir.path().join("Hero.astro")).unwrap(), original);
        assert_eq!(fs::read(dir.path().join("Hero.astro.bak")).unwrap(), original);
    }

    #[test]
    fn test_empty_content_keeps_fixable_script_as_is() {
        let original = b"if (ready {\n  run();\n}\n";
        let dir = repo_with("a.js", original);
        let outcome = write_file(dir.path(), Path::new("a.js"), "performance", "");

        assert!(outcome.success);
        assert!(!outcome.content_discarded);
        assert_eq!(outcome.original_sha256, outcome.written_sha256);
        assert_eq!(fs::read(dir.path().join("a.js")).unwrap(), original);
    }

    #[test]
    fn test_paths_outside_repo_are_rejected() {
        let outer = tempdir().unwrap();
        let repo = outer.path().join("repo");
        fs::create_dir(&repo).unwrap();
        fs::write(outer.path().join("x.css"), "x {}\n").unwrap();

        for path in [PathBuf::from("../x.css"), outer.path().join("x.css")] {
            let outcome = write_file(&repo, &path, "theme", "y {}\n");
            assert!(!outcome.success);
            assert_eq!(outcome.error, Some(MutationErrorKind::FileNotFound));
        }
        assert_eq!(fs::read_to_string(outer.path().join("x.css")).unwrap(), "x {}\n");
        assert!(!outer.path().join("x.css.bak").exists());
    }

    #[test]
    fn test_missing_file_fails_without_backup() {
        let dir = tempdir().unwrap();
        let outcome = write_file(dir.path(), Path::new("nope.css"), "theme", "a {}");

        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(MutationErrorKind::FileNotFound));
        assert_eq!(outcome.error.unwrap().to_string(), "file-not-found");
        assert!(outcome.backup_path.is_none());
        assert!(!dir.path().join("nope.css.bak").exists());
    }

    #[test]
    fn test_astro_directive_stripped_before_write() {
        let dir = repo_with("src/Hero.astro", b"<Hero />\n");
        let outcome = write_file(
            dir.path(),
            Path::new("src/Hero.astro"),
            "animation",
            "<Hero client:load />\n",
        );

        assert!(outcome.success);
        assert!(outcome.sanitized);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/Hero.astro")).unwrap(),
            "<Hero />\n"
        );
    }

    #[test]
    fn test_fixable_script_content_adopts_fix() {
        let dir = repo_with("app.js", b"run();\n");
        let outcome = write_file(
            dir.path(),
            Path::new("app.js"),
            "performance",
            "if (ready {\n  run();\n}\n",
        );

        assert!(outcome.success);
        assert!(!outcome.content_discarded);
        assert_eq!(
            fs::read_to_string(dir.path().join("app.js")).unwrap(),
            "if (ready) {\n  run();\n}\n"
        );
    }

    #[test]
    fn test_unfixable_content_falls_back_to_original() {
        let dir = repo_with("layout.css", b".grid { display: grid; }\n");
        let outcome = write_file(
            dir.path(),
            Path::new("layout.css"),
            "layout",
            ".grid { display: flex;\n",
        );

        assert!(outcome.success);
        assert!(outcome.content_discarded);
        assert!(!outcome.changed_file());
        assert_eq!(
            fs::read_to_string(dir.path().join("layout.css")).unwrap(),
            ".grid { display: grid; }\n"
        );
    }

    #[test]
    fn test_backup_failure_reports_backup_failed() {
        let dir = repo_with("nav.css", b"nav {}\n");
        // A directory where the backup file should go makes the copy fail.
        fs::create_dir(dir.path().join("nav.css.bak")).unwrap();

        let outcome = write_file(dir.path(), Path::new("nav.css"), "navigation", "nav { }\n");

        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(MutationErrorKind::BackupFailed));
        assert_eq!(fs::read_to_string(dir.path().join("nav.css")).unwrap(), "nav {}\n");
    }

    #[test]
    fn test_unreadable_original_reports_io_error_and_leaves_file() {
        let bytes: &[u8] = &[0xff, 0xfe, 0x00, 0x7b];
        let dir = repo_with("bad.js", bytes);
        let outcome = write_file(dir.path(), Path::new("bad.js"), "component", "ok();\n");

        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(MutationErrorKind::IoError));
        assert_eq!(fs::read(dir.path().join("bad.js")).unwrap(), bytes);
    }

    #[test]
    fn test_second_attempt_overwrites_backup() {
        let dir = repo_with("a.css", b"a {}\n");
        write_file(dir.path(), Path::new("a.css"), "theme", "b {}\n");
        write_file(dir.path(), Path::new("a.css"), "theme", "c {}\n");

        assert_eq!(fs::read_to_string(dir.path().join("a.css.bak")).unwrap(), "b {}\n");
        assert_eq!(fs::read_to_string(dir.path().join("a.css")).unwrap(), "c {}\n");
    }
}
