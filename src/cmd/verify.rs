//! Post-mutation checks: `uiforge verify`.

use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

pub fn cmd_verify(
    project_dir: &Path,
    repo_dir: Option<&Path>,
    paths: &[PathBuf],
    revert: bool,
) -> Result<()> {
    use uiforge::ui::icons::{CHECK, CROSS, REVERT, WARN};
    use uiforge::verify::{Severity, verify_and_revert};

    let repo_dir = super::resolve_dir(project_dir, repo_dir);
    let report = verify_and_revert(&repo_dir, paths, revert);

    println!();
    if report.issues.is_empty() {
        println!(
            "{} {} file(s) verified, no issues",
            CHECK,
            report.verified_files.len()
        );
    } else {
        for issue in &report.issues {
            let icon = match issue.severity {
                Severity::High => CROSS,
                Severity::Medium => WARN,
            };
            println!(
                "{} {} {} {}",
                icon,
                style(format!("[{}]", issue.severity)).yellow(),
                style(issue.file.display()).bold(),
                issue.issue
            );
        }
    }

    for path in &report.reverted.reverted {
        println!("{} reverted {}", REVERT, path.display());
    }
    for failure in &report.reverted.failed {
        println!(
            "{} could not revert {} ({}): {}",
            CROSS,
            failure.path.display(),
            failure.code,
            failure.error
        );
    }
    println!();

    let high = report.count(Severity::High);
    if high > report.reverted.reverted.len() {
        anyhow::bail!("{} high-severity issue(s) remain", high - report.reverted.reverted.len());
    }
    Ok(())
}
