//! File classification: `uiforge scan`.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn cmd_scan(project_dir: &Path, dir: Option<&Path>, json: bool) -> Result<()> {
    use uiforge::config::{CliOverrides, Config};
    use uiforge::scan::{Aspect, scan};

    let config = Config::new(project_dir.to_path_buf(), CliOverrides::default())?;
    let repo_dir = super::resolve_dir(project_dir, dir);

    let inventory = scan(&repo_dir, &config.workflow.scan)
        .with_context(|| format!("Failed to scan {}", repo_dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    println!();
    println!(
        "{} {} UI file(s) in {}",
        uiforge::ui::icons::FOLDER,
        style(inventory.len()).bold(),
        repo_dir.display()
    );

    for aspect in Aspect::ALL {
        let mut entries = inventory.by_aspect(aspect).peekable();
        if entries.peek().is_none() {
            continue;
        }
        println!();
        println!("{}", style(aspect).cyan().bold());
        for entry in entries {
            println!(
                "  {:<60} {:<12} {:>9}",
                entry.path.display().to_string(),
                entry.category.to_string(),
                format!("{} B", entry.size)
            );
        }
    }

    let summary = inventory.summary();
    if !summary.files_by_extension.is_empty() {
        println!();
        let parts: Vec<String> = summary
            .files_by_extension
            .iter()
            .map(|(ext, count)| format!("{ext}: {count}"))
            .collect();
        println!("{}", style(parts.join("  ")).dim());
    }
    println!();
    Ok(())
}
