//! Repository acquisition.
//!
//! A run starts from a [`RepoLocation`]. [`GitSource`] clones remote URLs with
//! `git2` and reuses a checkout that is already present; [`LocalSource`] only
//! works with directories that already exist on disk.

use async_trait::async_trait;
use git2::Repository;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::AcquisitionError;

/// Where the working copy comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RepoLocation {
    /// Clone `url` into `dest`
    Remote { url: String, dest: PathBuf },
    /// Use an existing directory as-is
    Local { path: PathBuf },
}

impl RepoLocation {
    /// The directory the working copy ends up in.
    pub fn working_dir(&self) -> &Path {
        match self {
            RepoLocation::Remote { dest, .. } => dest,
            RepoLocation::Local { path } => path,
        }
    }
}

impl std::fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoLocation::Remote { url, dest } => write!(f, "{} -> {}", url, dest.display()),
            RepoLocation::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Produces an absolute working-copy directory for a location.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn acquire(&self, location: &RepoLocation) -> Result<PathBuf, AcquisitionError>;
}

/// Clones remote repositories; passes local directories through.
#[derive(Debug, Clone, Default)]
pub struct GitSource;

#[async_trait]
impl RepositorySource for GitSource {
    async fn acquire(&self, location: &RepoLocation) -> Result<PathBuf, AcquisitionError> {
        match location {
            RepoLocation::Local { path } => existing_dir(path),
            RepoLocation::Remote { url, dest } => {
                if is_non_empty_dir(dest) {
                    if Repository::open(dest).is_err() {
                        return Err(AcquisitionError::TargetNotEmpty { path: dest.clone() });
                    }
                    info!(dest = %dest.display(), "reusing existing checkout");
                    return existing_dir(dest);
                }

                let url = url.clone();
                let target = dest.clone();
                info!(url = %url, dest = %target.display(), "cloning repository");
                tokio::task::spawn_blocking(move || clone_into(&url, &target))
                    .await
                    .map_err(|e| AcquisitionError::Task(e.to_string()))??;
                existing_dir(dest)
            }
        }
    }
}

/// Never touches the network. Remote locations resolve to their `dest`,
/// which must already exist.
#[derive(Debug, Clone, Default)]
pub struct LocalSource;

#[async_trait]
impl RepositorySource for LocalSource {
    async fn acquire(&self, location: &RepoLocation) -> Result<PathBuf, AcquisitionError> {
        existing_dir(location.working_dir())
    }
}

fn clone_into(url: &str, dest: &Path) -> Result<(), AcquisitionError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| AcquisitionError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Repository::clone(url, dest).map_err(|source| AcquisitionError::Clone {
        url: url.to_string(),
        source,
    })?;
    debug!(dest = %dest.display(), "clone finished");
    Ok(())
}

fn existing_dir(path: &Path) -> Result<PathBuf, AcquisitionError> {
    if !path.is_dir() {
        return Err(AcquisitionError::MissingDirectory {
            path: path.to_path_buf(),
        });
    }
    fs::canonicalize(path).map_err(|source| AcquisitionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_non_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::tempdir;

    fn init_repo_with_file(dir: &Path) {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("uiforge", "uiforge@localhost").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }

    #[tokio::test]
    async fn test_local_source_canonicalizes() {
        let dir = tempdir().unwrap();
        let location = RepoLocation::Local {
            path: dir.path().join("."),
        };
        let resolved = LocalSource.acquire(&location).await.unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_local_source_missing_dir() {
        let dir = tempdir().unwrap();
        let location = RepoLocation::Local {
            path: dir.path().join("nope"),
        };
        let err = LocalSource.acquire(&location).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::MissingDirectory { .. }));
    }

    #[tokio::test]
    async fn test_git_source_clones_local_repository() {
        let upstream = tempdir().unwrap();
        init_repo_with_file(upstream.path());
        let work = tempdir().unwrap();
        let dest = work.path().join("checkout");

        let location = RepoLocation::Remote {
            url: upstream.path().to_string_lossy().into_owned(),
            dest: dest.clone(),
        };
        let resolved = GitSource.acquire(&location).await.unwrap();
        assert!(resolved.join("index.html").is_file());

        // Second acquire reuses the checkout instead of cloning again.
        fs::write(dest.join("local-edit.css"), "a{}").unwrap();
        let again = GitSource.acquire(&location).await.unwrap();
        assert_eq!(again, resolved);
        assert!(again.join("local-edit.css").is_file());
    }

    #[tokio::test]
    async fn test_git_source_refuses_non_git_dest() {
        let work = tempdir().unwrap();
        fs::write(work.path().join("stray.txt"), "x").unwrap();
        let location = RepoLocation::Remote {
            url: "https://example.invalid/repo.git".to_string(),
            dest: work.path().to_path_buf(),
        };
        let err = GitSource.acquire(&location).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::TargetNotEmpty { .. }));
    }

    #[tokio::test]
    async fn test_git_source_bad_url_is_clone_error() {
        let work = tempdir().unwrap();
        let location = RepoLocation::Remote {
            url: work.path().join("no-such-upstream").to_string_lossy().into_owned(),
            dest: work.path().join("dest"),
        };
        let err = GitSource.acquire(&location).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Clone { .. }));
    }

    #[test]
    fn test_location_serializes_with_type_tag() {
        let location = RepoLocation::Local {
            path: PathBuf::from("/tmp/app"),
        };
        let json = serde_json::to_string(&location).unwrap();
        assert!(json.contains("\"type\":\"local\""));
    }
}
