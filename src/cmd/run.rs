//! Full enhancement workflow: `uiforge run`.

use anyhow::Result;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;

use uiforge::config::{CliOverrides, Config};
use uiforge::workflow::RunRecord;

pub async fn cmd_run(project_dir: PathBuf, overrides: CliOverrides) -> Result<()> {
    use dialoguer::Confirm;
    use uiforge::audit::AuditLogger;
    use uiforge::generator::CommandGenerator;
    use uiforge::source::GitSource;
    use uiforge::ui::RunUI;
    use uiforge::workflow::Orchestrator;

    let config = Config::new(project_dir, overrides)?;
    config.ensure_directories()?;

    for warning in config.validate() {
        println!("{} {}", uiforge::ui::icons::WARN, style(warning).yellow());
    }

    let generator = CommandGenerator::new(&config.generator_cmd, config.generator_args.clone())
        .with_working_dir(config.project_dir.clone());

    println!();
    println!("{} {}", uiforge::ui::icons::FOLDER, style(&config.location).bold());
    println!("  generator:   {}", generator.command_line());
    println!("  max targets: {}", config.workflow.max_targets);
    println!(
        "  auto-revert: {}",
        if config.workflow.auto_revert { "on" } else { "off" }
    );
    println!();

    if !config.yes {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "Modify up to {} file(s) in this repository?",
                config.workflow.max_targets
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirm {
            println!("Run cancelled");
            return Ok(());
        }
    }

    let ui = Arc::new(RunUI::new(config.verbose));
    let orchestrator = Orchestrator::new(
        Box::new(GitSource),
        Box::new(generator.clone()),
        Box::new(generator),
        config.workflow.clone(),
    )
    .with_ui(ui);

    let record = orchestrator.run(config.location.clone()).await;

    let audit = AuditLogger::new(&config.audit_dir);
    let saved = audit.record_run(&record)?;

    print_report(&record);
    println!("Run record: {}", style(saved.display()).dim());
    println!();

    if let Some(err) = &record.error {
        anyhow::bail!("Run {} failed: {}", record.short_id(), err);
    }
    Ok(())
}

fn print_report(record: &RunRecord) {
    use uiforge::ui::icons::{CROSS, FILE_KEPT, FILE_MOD, REVERT, WARN};

    let width = console::Term::stdout()
        .size_checked()
        .map_or(80, |(_, cols)| usize::from(cols).clamp(40, 120));

    if let Some(plan) = &record.plan
        && !plan.title.is_empty()
    {
        println!();
        println!("{}", style(&plan.title).bold());
        if !plan.description.is_empty() {
            println!("{}", textwrap::indent(&textwrap::fill(&plan.description, width - 2), "  "));
        }
    }

    if !record.results.is_empty() {
        println!();
        println!("{}", style("Files").bold());
        for outcome in &record.results {
            let icon = match (outcome.success, outcome.content_discarded) {
                (false, _) => CROSS,
                (true, true) => FILE_KEPT,
                (true, false) => FILE_MOD,
            };
            println!(
                "  {} {} {}",
                icon,
                outcome.path.display(),
                style(format!("[{}]", outcome.enhancement_type)).dim()
            );
        }
    }

    if let Some(verification) = &record.verification {
        if !verification.issues.is_empty() {
            println!();
            println!("{}", style("Verification").bold());
            for issue in &verification.issues {
                let line = format!("{}: {}", issue.file.display(), issue.issue);
                println!(
                    "  {} {} {}",
                    WARN,
                    style(format!("[{}]", issue.severity)).yellow(),
                    textwrap::fill(&line, width - 14).replace('\n', "\n             ")
                );
            }
        }
        for path in &verification.reverted.reverted {
            println!("  {} reverted {}", REVERT, path.display());
        }
        for failure in &verification.reverted.failed {
            println!(
                "  {} could not revert {}: {}",
                CROSS,
                failure.path.display(),
                failure.error
            );
        }
    }

    if let Some(summary) = &record.summary {
        println!();
        println!("{}", textwrap::fill(&summary.to_string(), width));
    }
    println!();
}
