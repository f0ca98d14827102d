//! Restore files from their `.bak` siblings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::backup_path;
use crate::errors::RevertError;

/// Restore `repo_dir/path` from its backup and delete the backup.
pub fn revert(repo_dir: &Path, path: &Path) -> Result<(), RevertError> {
    let full_path = repo_dir.join(path);
    let backup = backup_path(&full_path);

    if !backup.is_file() {
        return Err(RevertError::NoBackup {
            path: path.to_path_buf(),
        });
    }

    fs::copy(&backup, &full_path).map_err(|source| RevertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    fs::remove_file(&backup).map_err(|source| RevertError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "reverted from backup");
    Ok(())
}

/// A path that could not be reverted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertFailure {
    pub path: PathBuf,
    /// Stable code: `no-backup` or `io-error`
    pub code: String,
    pub error: String,
}

/// Partition of a batch revert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertReport {
    pub reverted: Vec<PathBuf>,
    pub failed: Vec<RevertFailure>,
}

impl RevertReport {
    pub fn is_empty(&self) -> bool {
        self.reverted.is_empty() && self.failed.is_empty()
    }
}

/// Revert every path in order. A failure on one path never stops the rest.
pub fn revert_all<P: AsRef<Path>>(repo_dir: &Path, paths: &[P]) -> RevertReport {
    let mut report = RevertReport::default();
    for path in paths {
        let path = path.as_ref();
        match revert(repo_dir, path) {
            Ok(()) => report.reverted.push(path.to_path_buf()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "revert failed");
                report.failed.push(RevertFailure {
                    path: path.to_path_buf(),
                    code: err.code().to_string(),
                    error: err.to_string(),
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_revert_restores_and_removes_backup() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "new").unwrap();
        fs::write(dir.path().join("a.css.bak"), "old").unwrap();

        revert(dir.path(), Path::new("a.css")).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.css")).unwrap(), "old");
        assert!(!dir.path().join("a.css.bak").exists());
    }

    #[test]
    fn test_second_revert_fails_with_no_backup_and_keeps_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "new").unwrap();
        fs::write(dir.path().join("a.css.bak"), "old").unwrap();

        revert(dir.path(), Path::new("a.css")).unwrap();
        let err = revert(dir.path(), Path::new("a.css")).unwrap_err();

        assert_eq!(err.code(), "no-backup");
        assert_eq!(fs::read_to_string(dir.path().join("a.css")).unwrap(), "old");
    }

    #[test]
    fn test_revert_recreates_deleted_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gone.js.bak"), "x();").unwrap();

        revert(dir.path(), Path::new("gone.js")).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("gone.js")).unwrap(), "x();");
    }

    #[test]
    fn test_revert_all_partitions_results() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "new").unwrap();
        fs::write(dir.path().join("a.css.bak"), "old").unwrap();
        fs::write(dir.path().join("c.css"), "new").unwrap();
        fs::write(dir.path().join("c.css.bak"), "old").unwrap();

        let report = revert_all(dir.path(), &["a.css", "b.css", "c.css"]);

        assert_eq!(
            report.reverted,
            vec![PathBuf::from("a.css"), PathBuf::from("c.css")]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, PathBuf::from("b.css"));
        assert_eq!(report.failed[0].code, "no-backup");
    }

    #[test]
    fn test_revert_all_empty_input() {
        let dir = tempdir().unwrap();
        let report = revert_all::<PathBuf>(dir.path(), &[]);
        assert!(report.is_empty());
    }
}
