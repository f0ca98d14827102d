//! Backup restore: `uiforge revert`.

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

pub fn cmd_revert(
    project_dir: &Path,
    repo_dir: Option<&Path>,
    paths: &[PathBuf],
    last_run: bool,
) -> Result<()> {
    use uiforge::audit::AuditLogger;
    use uiforge::config::{CliOverrides, Config};
    use uiforge::mutation::revert_all;
    use uiforge::ui::icons::{CROSS, REVERT};

    let (repo_dir, paths) = if last_run {
        let config = Config::new(project_dir.to_path_buf(), CliOverrides::default())?;
        let record = AuditLogger::new(&config.audit_dir)
            .latest_run()?
            .context("No recorded runs to revert")?;
        let repo_dir = match repo_dir {
            Some(dir) => super::resolve_dir(project_dir, Some(dir)),
            None => record
                .repo_dir
                .clone()
                .context("The last run never acquired a repository")?,
        };
        println!("Reverting run {}", style(record.short_id()).bold());
        (repo_dir, record.mutated_paths())
    } else {
        (super::resolve_dir(project_dir, repo_dir), paths.to_vec())
    };

    if paths.is_empty() {
        println!("Nothing to revert");
        return Ok(());
    }

    let report = revert_all(&repo_dir, &paths);

    for path in &report.reverted {
        println!("{} {}", REVERT, path.display());
    }
    for failure in &report.failed {
        println!(
            "{} {} {}",
            CROSS,
            failure.path.display(),
            style(format!("({})", failure.error)).dim()
        );
    }
    println!(
        "{} reverted, {} failed",
        report.reverted.len(),
        report.failed.len()
    );

    if !report.failed.is_empty() {
        anyhow::bail!("{} file(s) could not be reverted", report.failed.len());
    }
    Ok(())
}
