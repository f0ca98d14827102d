//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `run`     | `Run`            |
//! | `scan`    | `Scan`           |
//! | `verify`  | `Verify`         |
//! | `revert`  | `Revert`         |
//! | `audit`   | `Audit`          |
//! | `config`  | `Config`         |

pub mod audit;
pub mod config;
pub mod revert;
pub mod run;
pub mod scan;
pub mod verify;

pub use audit::cmd_audit;
pub use config::cmd_config;
pub use revert::cmd_revert;
pub use run::cmd_run;
pub use scan::cmd_scan;
pub use verify::cmd_verify;

use std::path::{Path, PathBuf};

/// `dir` resolved against `project_dir`, or `project_dir` itself.
pub(crate) fn resolve_dir(project_dir: &Path, dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => project_dir.join(d),
        None => project_dir.to_path_buf(),
    }
}
