//! Run history: `uiforge audit`.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use super::super::AuditCommands;

pub fn cmd_audit(project_dir: &Path, command: &AuditCommands) -> Result<()> {
    use uiforge::audit::AuditLogger;
    use uiforge::config::{CliOverrides, Config};
    use uiforge::workflow::RunSummary;

    let config = Config::new(project_dir.to_path_buf(), CliOverrides::default())?;
    let audit = AuditLogger::new(&config.audit_dir);

    match command {
        AuditCommands::List => {
            let listings = audit.listings()?;
            println!();
            if listings.is_empty() {
                println!("No recorded runs in {}", config.audit_dir.display());
                println!();
                return Ok(());
            }

            println!(
                "{:<10} {:<20} {:<11} {:>7}  Repository",
                "Run", "Started", "Status", "Targets"
            );
            println!(
                "{:<10} {:<20} {:<11} {:>7}  ----------",
                "--------", "-------------------", "----------", "-------"
            );
            for listing in &listings {
                let record = &listing.record;
                println!(
                    "{:<10} {:<20} {:<11} {:>7}  {}",
                    record.short_id(),
                    record.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    listing.status(),
                    record.targets.len(),
                    record.location
                );
            }
            println!();
        }
        AuditCommands::Show { id, json } => {
            let record = audit
                .find_run(id)?
                .with_context(|| format!("No run matching '{}'", id))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }

            println!();
            println!("Run {}", style(&record.run_id).bold());
            println!("  started:    {}", record.started_at.to_rfc3339());
            if let Some(ended) = record.ended_at {
                println!("  ended:      {}", ended.to_rfc3339());
            }
            println!("  repository: {}", record.location);
            println!("  phase:      {}", record.phase);
            if let Some(err) = &record.error {
                println!("  error:      {}", style(err).red());
            }
            let summary = record
                .summary
                .clone()
                .unwrap_or_else(|| RunSummary::from_record(&record));
            println!("  summary:    {}", summary);

            if !record.audit_log.is_empty() {
                println!();
                println!("{}", style("Log").bold());
                for line in &record.audit_log {
                    println!("  {}", line);
                }
            }
            println!();
        }
    }
    Ok(())
}
