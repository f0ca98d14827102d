//! The phased run loop.
//!
//! [`Orchestrator::step`] performs exactly one transition on a [`RunRecord`];
//! [`Orchestrator::run`] steps a fresh record until it reaches
//! [`Phase::Complete`]. Failures never escape as `Err`: they are stored on the
//! record, which then jumps to `Complete`.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::plan::{EnhancementPlan, select_targets};
use super::prompts::{build_content_prompt, build_opportunities_prompt, build_plan_prompt};
use super::record::{Phase, RunRecord, RunSummary};
use crate::analysis::{Analysis, Opportunities, analyze_capabilities};
use crate::errors::{MutationError, RunError};
use crate::generator::{ContentGenerator, generate_json};
use crate::mutation::{MutationOutcome, write_file};
use crate::scan::{ScanOptions, scan};
use crate::source::{RepoLocation, RepositorySource};
use crate::ui::RunUI;
use crate::util::strip_code_fence;
use crate::verify::verify_and_revert;

/// Default cap on files mutated per run.
pub const DEFAULT_MAX_TARGETS: usize = 10;

/// Knobs that shape a run.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub scan: ScanOptions,
    pub max_targets: usize,
    /// Revert files with hard syntax errors during Verify
    pub auto_revert: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            max_targets: DEFAULT_MAX_TARGETS,
            auto_revert: true,
        }
    }
}

pub struct Orchestrator {
    source: Box<dyn RepositorySource>,
    /// Produces opportunity and plan JSON
    planner: Box<dyn ContentGenerator>,
    /// Produces replacement file content
    writer: Box<dyn ContentGenerator>,
    options: WorkflowOptions,
    ui: Option<Arc<RunUI>>,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn RepositorySource>,
        planner: Box<dyn ContentGenerator>,
        writer: Box<dyn ContentGenerator>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            source,
            planner,
            writer,
            options,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: Arc<RunUI>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Run from `Discover` to `Complete`.
    pub async fn run(&self, location: RepoLocation) -> RunRecord {
        let mut record = RunRecord::new(location);
        info!(run_id = %record.run_id, location = %record.location, "run started");

        let mut steps = 0usize;
        while !record.phase.is_terminal() {
            record = self.step(record).await;
            steps += 1;
            debug_assert!(steps <= record.step_bound());
        }

        info!(
            run_id = %record.run_id,
            steps,
            error = record.error.as_ref().map(|e| e.code()),
            "run finished"
        );
        record
    }

    /// Perform one transition. A `Complete` record is returned untouched.
    pub async fn step(&self, mut record: RunRecord) -> RunRecord {
        let phase = record.phase;
        if phase.is_terminal() {
            return record;
        }
        if let Some(ui) = &self.ui {
            ui.start_phase(phase);
        }
        debug!(phase = %phase, cursor = record.cursor, "step");

        let result = match phase {
            Phase::Discover => self.discover(&mut record).await,
            Phase::Classify => self.classify(&mut record),
            Phase::Analyze => self.analyze(&mut record).await,
            Phase::Plan => self.plan(&mut record).await,
            Phase::Mutate => self.mutate(&mut record).await,
            Phase::Verify => self.verify(&mut record),
            Phase::Summarize => self.summarize(&mut record),
            Phase::Complete => Ok(()),
        };

        if let Err(err) = result {
            warn!(phase = %phase, error = %err, "phase failed, ending run");
            record.fail(err);
        }
        if record.phase.is_terminal() {
            record.ended_at = Some(Utc::now());
            if let Some(ui) = &self.ui {
                ui.finish(&record);
            }
        }
        record
    }

    async fn discover(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = self.source.acquire(&record.location).await?;
        info!(repo_dir = %repo_dir.display(), "repository ready");
        record.log(format!("[discover] working copy at {}", repo_dir.display()));
        record.repo_dir = Some(repo_dir);
        record.phase = Phase::Classify;
        Ok(())
    }

    fn classify(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = repo_dir_of(record)?;
        record.inventory = scan(&repo_dir, &self.options.scan)?;
        record.log(format!(
            "[classify] {} UI file(s) found",
            record.inventory.len()
        ));
        record.phase = Phase::Analyze;
        Ok(())
    }

    async fn analyze(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = repo_dir_of(record)?;
        let capabilities = analyze_capabilities(&repo_dir, &record.inventory);
        let prompt = build_opportunities_prompt(&record.inventory.summary(), &capabilities);
        let opportunities: Opportunities = generate_json(self.planner.as_ref(), &prompt).await?;

        record.log(format!(
            "[analyze] {} sampled file(s), {} opportunity item(s)",
            capabilities.sampled_files,
            opportunities.total()
        ));
        record.analysis = Some(Analysis {
            capabilities,
            opportunities,
        });
        record.phase = Phase::Plan;
        Ok(())
    }

    async fn plan(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = repo_dir_of(record)?;
        let opportunities = record
            .analysis
            .as_ref()
            .map(|a| a.opportunities.clone())
            .unwrap_or_default();
        let prompt = build_plan_prompt(&record.inventory, &opportunities);
        let plan: EnhancementPlan = generate_json(self.planner.as_ref(), &prompt).await?;

        let (targets, skipped) = select_targets(
            &repo_dir,
            &record.inventory,
            &plan,
            &self.options.scan,
            self.options.max_targets,
        );
        for skip in &skipped {
            record.log(format!(
                "[plan] skipped {}: {}",
                skip.path.display(),
                skip.reason
            ));
        }
        record.log(format!(
            "[plan] '{}': {} target(s) selected",
            plan.title,
            targets.len()
        ));
        info!(title = %plan.title, targets = targets.len(), skipped = skipped.len(), "plan ready");

        record.plan = Some(plan);
        record.targets = targets;
        record.cursor = 0;
        record.phase = if record.targets.is_empty() {
            Phase::Summarize
        } else {
            if let Some(ui) = &self.ui {
                ui.start_targets(record.targets.len());
            }
            Phase::Mutate
        };
        Ok(())
    }

    async fn mutate(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = repo_dir_of(record)?;
        if let Some(target) = record.targets.get(record.cursor).cloned() {
            let path = target.entry.path.clone();
            if let Some(ui) = &self.ui {
                ui.target_started(&path);
            }

            let original = match fs::read_to_string(repo_dir.join(&path)) {
                Ok(text) => text,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "could not read target, prompting without its content"
                    );
                    String::new()
                }
            };
            let prompt = build_content_prompt(&target, &original, &record.results);
            let outcome = match self.writer.generate(&prompt).await {
                Ok(generated) => {
                    let content = if generated.trim().is_empty() {
                        String::new()
                    } else {
                        strip_code_fence(&generated)
                    };
                    write_file(&repo_dir, &path, &target.enhancement_type, &content)
                }
                Err(source) => {
                    warn!(
                        path = %path.display(),
                        error = %source,
                        "content generation failed, skipping target"
                    );
                    let err = MutationError::Generation {
                        path: path.clone(),
                        source,
                    };
                    MutationOutcome::failure(&path, &target.enhancement_type, &err)
                }
            };

            record.log(match (&outcome.error, outcome.content_discarded) {
                (Some(kind), _) => format!("[mutate] {} failed: {}", path.display(), kind),
                (None, true) => format!(
                    "[mutate] {} kept original content (generated content failed validation)",
                    path.display()
                ),
                (None, false) => format!("[mutate] {} written", path.display()),
            });
            if let Some(ui) = &self.ui {
                ui.target_finished(&outcome);
            }
            record.results.push(outcome);
            record.cursor += 1;
        }

        if record.cursor >= record.targets.len() {
            record.phase = Phase::Verify;
        }
        Ok(())
    }

    fn verify(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let repo_dir = repo_dir_of(record)?;
        let paths = record.mutated_paths();
        let report = verify_and_revert(&repo_dir, &paths, self.options.auto_revert);

        for issue in &report.issues {
            record.log(format!(
                "[verify] {} ({}): {}",
                issue.file.display(),
                issue.severity,
                issue.issue
            ));
        }
        for path in &report.reverted.reverted {
            record.log(format!("[verify] reverted {}", path.display()));
        }
        for failure in &report.reverted.failed {
            record.log(format!(
                "[verify] could not revert {}: {}",
                failure.path.display(),
                failure.error
            ));
        }
        record.verification = Some(report);
        record.phase = Phase::Summarize;
        Ok(())
    }

    fn summarize(&self, record: &mut RunRecord) -> Result<(), RunError> {
        let summary = RunSummary::from_record(record);
        record.log(format!("[summarize] {}", summary));
        record.summary = Some(summary);
        record.phase = Phase::Complete;
        Ok(())
    }
}

fn repo_dir_of(record: &RunRecord) -> Result<PathBuf, RunError> {
    record
        .repo_dir
        .clone()
        .ok_or_else(|| RunError::Acquisition("repository was not acquired".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{GenerationError, MutationErrorKind};
    use crate::mutation::backup_path;
    use crate::source::LocalSource;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    /// Replies from a fixed script, in order. `None` simulates a generator failure.
    struct Scripted {
        replies: Mutex<VecDeque<Option<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Some(reply)) => Ok(reply),
                _ => Err(GenerationError::NonZeroExit {
                    exit_code: 1,
                    stderr: "scripted failure".to_string(),
                }),
            }
        }
    }

    struct SharedScripted(Arc<Scripted>);

    #[async_trait]
    impl ContentGenerator for SharedScripted {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.0.generate(prompt).await
        }
    }

    const OPPORTUNITIES: &str = r#"{"visual_design": ["refresh palette"]}"#;

    fn plan_json(paths: &[&str]) -> String {
        let mods: Vec<String> = paths
            .iter()
            .map(|p| {
                format!(
                    r#"{{"path": "{}", "enhancement_type": "visual_design", "description": "polish"}}"#,
                    p
                )
            })
            .collect();
        format!(
            r#"Here is the plan: {{"title": "Polish", "description": "d", "changes": [], "file_modifications": [{}]}}"#,
            mods.join(",")
        )
    }

    fn repo(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (rel, content) in files {
            let full = dir.path().join(rel);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    fn orchestrator(planner: Vec<Option<&str>>, writer: Arc<Scripted>) -> Orchestrator {
        Orchestrator::new(
            Box::new(LocalSource),
            Box::new(Scripted::new(planner)),
            Box::new(SharedScripted(writer)),
            WorkflowOptions::default(),
        )
    }

    fn local(dir: &Path) -> RepoLocation {
        RepoLocation::Local {
            path: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_full_run_mutates_targets_in_order() {
        let dir = repo(&[
            ("src/theme.css", ":root { --brand: blue; }\n"),
            ("src/Button.jsx", "export const Button = () => <button />;\n"),
        ]);
        let plan = plan_json(&["src/theme.css", "src/missing.css", "src/Button.jsx"]);
        let writer = Arc::new(Scripted::new(vec![
            Some("```css\n:root { --brand: teal; }\n```"),
            Some("export const Button = () => <button className=\"btn\" />;\n"),
        ]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer.clone());

        let record = orch.run(local(dir.path())).await;

        assert_eq!(record.phase, Phase::Complete);
        assert!(record.error.is_none());
        assert_eq!(record.targets.len(), 2);
        assert_eq!(record.cursor, 2);
        assert_eq!(record.results.len(), 2);
        assert!(record.results.iter().all(|r| r.success));
        assert_eq!(
            fs::read_to_string(dir.path().join("src/theme.css")).unwrap(),
            ":root { --brand: teal; }\n"
        );
        assert!(backup_path(&dir.path().join("src/theme.css")).is_file());

        // The second content prompt reports the first outcome.
        let prompts = writer.prompts.lock().unwrap();
        assert!(!prompts[0].contains("Already processed"));
        assert!(prompts[1].contains("`src/theme.css` [visual_design]: updated"));

        let summary = record.summary.unwrap();
        assert_eq!(summary.targets, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(record.ended_at.is_some());
        assert!(record.audit_log.iter().any(|l| l.contains("skipped src/missing.css")));
    }

    #[tokio::test]
    async fn test_step_count_and_cursor_progression() {
        let dir = repo(&[("a.css", "a{}"), ("b.css", "b{}"), ("c.css", "c{}")]);
        let plan = plan_json(&["a.css", "b.css", "c.css"]);
        let writer = Arc::new(Scripted::new(vec![Some(""), Some(""), Some("")]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer);

        let mut record = RunRecord::new(local(dir.path()));
        let mut steps = 0;
        let mut mutate_steps = 0;
        while !record.phase.is_terminal() {
            let before = record.clone();
            record = orch.step(record).await;
            steps += 1;
            if before.phase == Phase::Mutate {
                mutate_steps += 1;
                assert_eq!(record.cursor, before.cursor + 1);
                assert_eq!(record.results.len(), before.results.len() + 1);
            }
        }

        assert!(record.error.is_none());
        assert_eq!(mutate_steps, 3);
        assert_eq!(steps, 6 + record.targets.len());
        // Empty replies leave every file untouched.
        assert_eq!(fs::read_to_string(dir.path().join("b.css")).unwrap(), "b{}");
    }

    #[tokio::test]
    async fn test_malformed_plan_json_completes_with_error() {
        let dir = repo(&[("a.css", "a{}")]);
        let writer = Arc::new(Scripted::new(vec![]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some("{\"title\": ")], writer);

        let record = orch.run(local(dir.path())).await;
        assert_eq!(record.phase, Phase::Complete);
        assert!(matches!(record.error, Some(RunError::Generation(_))));
        assert!(record.plan.is_none());
        assert!(record.results.is_empty());
        assert!(record.analysis.is_some());
    }

    #[tokio::test]
    async fn test_no_existing_targets_skips_to_summarize() {
        let dir = repo(&[("a.css", "a{}")]);
        let plan = plan_json(&["nope.css"]);
        let writer = Arc::new(Scripted::new(vec![]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer);

        let mut record = RunRecord::new(local(dir.path()));
        for _ in 0..4 {
            record = orch.step(record).await;
        }
        assert_eq!(record.phase, Phase::Summarize);
        record = orch.step(record).await;
        assert_eq!(record.phase, Phase::Complete);
        assert!(record.verification.is_none());
        assert_eq!(record.summary.unwrap().targets, 0);
    }

    #[tokio::test]
    async fn test_missing_repository_fails_discover() {
        let dir = tempdir().unwrap();
        let writer = Arc::new(Scripted::new(vec![]));
        let orch = orchestrator(vec![], writer);

        let record = orch.run(local(&dir.path().join("absent"))).await;
        assert!(matches!(record.error, Some(RunError::Acquisition(_))));
        assert!(record.repo_dir.is_none());
        assert_eq!(record.audit_log.len(), 1);
    }

    #[tokio::test]
    async fn test_content_generation_failure_skips_only_that_target() {
        let dir = repo(&[("a.css", "a{}"), ("b.css", "b{}"), ("c.css", "c{}")]);
        let plan = plan_json(&["a.css", "b.css", "c.css"]);
        let writer = Arc::new(Scripted::new(vec![
            Some("a { color: red; }"),
            None,
            Some("c { color: blue; }"),
        ]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer.clone());

        let record = orch.run(local(dir.path())).await;
        assert!(record.error.is_none());
        assert_eq!(record.phase, Phase::Complete);
        assert_eq!(record.cursor, record.targets.len());
        assert_eq!(record.results.len(), 3);

        let failed = &record.results[1];
        assert!(!failed.success);
        assert_eq!(failed.error, Some(MutationErrorKind::GenerationFailed));
        assert!(failed.backup_path.is_none());
        assert!(!backup_path(&dir.path().join("b.css")).exists());
        assert_eq!(fs::read_to_string(dir.path().join("b.css")).unwrap(), "b{}");
        assert_eq!(
            fs::read_to_string(dir.path().join("c.css")).unwrap(),
            "c { color: blue; }"
        );

        let prompts = writer.prompts.lock().unwrap();
        assert!(prompts[2].contains("`b.css` [visual_design]: failed (generation-failed)"));
        let summary = record.summary.unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_non_utf8_target_is_attempted_and_run_continues() {
        let dir = repo(&[("a.css", "a{}"), ("b.css", "b{}")]);
        fs::write(dir.path().join("a.css"), [0xff, 0xfe, 0x7b]).unwrap();
        let plan = plan_json(&["a.css", "b.css"]);
        let writer = Arc::new(Scripted::new(vec![Some("a { }"), Some("b { }")]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer.clone());

        let record = orch.run(local(dir.path())).await;
        assert!(record.error.is_none());
        assert_eq!(record.results.len(), 2);
        assert_eq!(record.results[0].error, Some(MutationErrorKind::IoError));
        assert!(record.results[1].success);
        let prompts = writer.prompts.lock().unwrap();
        assert!(prompts[0].contains("## Current content\n\n```\n\n```"));
        assert_eq!(fs::read(dir.path().join("a.css")).unwrap(), vec![0xff, 0xfe, 0x7b]);
    }

    #[tokio::test]
    async fn test_verify_reverts_hard_syntax_errors() {
        // The original is already unbalanced, so the writer falls back to it
        // and verification flags it.
        let dir = repo(&[("broken.css", "a { color: red;\n")]);
        let plan = plan_json(&["broken.css"]);
        let writer = Arc::new(Scripted::new(vec![Some("a { color: blue;\n")]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer);

        let record = orch.run(local(dir.path())).await;
        assert!(record.error.is_none());
        assert!(record.results[0].content_discarded);

        let verification = record.verification.as_ref().unwrap();
        assert_eq!(verification.reverted.reverted, vec![PathBuf::from("broken.css")]);
        assert!(!backup_path(&dir.path().join("broken.css")).exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("broken.css")).unwrap(),
            "a { color: red;\n"
        );

        let summary = record.summary.unwrap();
        assert_eq!(summary.high_issues, 1);
        assert_eq!(summary.reverted, 1);
        assert_eq!(summary.content_discarded, 1);
    }

    #[tokio::test]
    async fn test_target_removed_before_mutate_is_file_not_found() {
        let dir = repo(&[("a.css", "a{}")]);
        let plan = plan_json(&["a.css"]);
        let writer = Arc::new(Scripted::new(vec![Some("a { }")]));
        let orch = orchestrator(vec![Some(OPPORTUNITIES), Some(&plan)], writer);

        let mut record = RunRecord::new(local(dir.path()));
        for _ in 0..4 {
            record = orch.step(record).await;
        }
        assert_eq!(record.phase, Phase::Mutate);
        fs::remove_file(dir.path().join("a.css")).unwrap();

        record = orch.step(record).await;
        assert_eq!(record.phase, Phase::Verify);
        assert_eq!(record.results[0].error, Some(MutationErrorKind::FileNotFound));
        assert!(!backup_path(&dir.path().join("a.css")).exists());
    }

    #[tokio::test]
    async fn test_complete_record_is_not_stepped() {
        let dir = tempdir().unwrap();
        let orch = orchestrator(vec![], Arc::new(Scripted::new(vec![])));
        let mut record = RunRecord::new(local(dir.path()));
        record.phase = Phase::Complete;
        let after = orch.step(record.clone()).await;
        assert_eq!(after, record);
    }
}
