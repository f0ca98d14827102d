//! End-to-end workflow scenarios against scratch repositories.
//!
//! Generators are scripted in memory so every run is deterministic.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

use uiforge::audit::AuditLogger;
use uiforge::errors::{GenerationError, MutationErrorKind, RunError};
use uiforge::generator::ContentGenerator;
use uiforge::mutation::{backup_path, revert_all};
use uiforge::scan::{ScanOptions, scan};
use uiforge::source::{LocalSource, RepoLocation};
use uiforge::verify::{Severity, verify_and_revert};
use uiforge::workflow::{Orchestrator, Phase, RunRecord, WorkflowOptions};

/// Replies in order; runs out into a generator failure.
struct Scripted {
    replies: Mutex<VecDeque<String>>,
}

impl Scripted {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

struct Handle(Arc<Scripted>);

#[async_trait]
impl ContentGenerator for Handle {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.0
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(GenerationError::NoJson)
    }
}

const OPPORTUNITIES: &str = r#"{"visual_design": ["modern palette"], "animations": ["hover states"]}"#;

fn plan_for(paths: &[&str]) -> String {
    let mods: Vec<String> = paths
        .iter()
        .map(|p| format!(r#"{{"file": "{p}", "enhancement_type": "animation", "changes": "add motion"}}"#))
        .collect();
    format!(
        "```json\n{{\"title\": \"Motion pass\", \"file_modifications\": [{}]}}\n```",
        mods.join(", ")
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

async fn run(dir: &Path, planner: &[&str], writer: &[&str]) -> RunRecord {
    Orchestrator::new(
        Box::new(LocalSource),
        Box::new(Handle(Scripted::new(planner))),
        Box::new(Handle(Scripted::new(writer))),
        WorkflowOptions::default(),
    )
    .run(RepoLocation::Local {
        path: dir.to_path_buf(),
    })
    .await
}

#[tokio::test]
async fn test_astro_hydration_directive_removed_during_run() {
    let dir = repo(&[("src/components/Hero.astro", "<section><Hero /></section>\n")]);
    let plan = plan_for(&["src/components/Hero.astro"]);

    let record = run(
        dir.path(),
        &[OPPORTUNITIES, &plan],
        &["```astro\n<section><Hero client:visible /></section>\n```"],
    )
    .await;

    assert!(record.error.is_none());
    assert_eq!(record.results.len(), 1);
    let outcome = &record.results[0];
    assert!(outcome.success);
    assert!(outcome.sanitized);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/components/Hero.astro")).unwrap(),
        "<section><Hero /></section>\n"
    );
}

#[tokio::test]
async fn test_invalid_generated_content_keeps_original() {
    let original = ".card { color: red; }\n";
    let dir = repo(&[("styles/card.css", original)]);
    let plan = plan_for(&["styles/card.css"]);

    let record = run(
        dir.path(),
        &[OPPORTUNITIES, &plan],
        &[".card { color: red;\n"],
    )
    .await;

    assert!(record.error.is_none());
    let outcome = &record.results[0];
    assert!(outcome.success);
    assert!(outcome.content_discarded);
    assert_eq!(
        fs::read_to_string(dir.path().join("styles/card.css")).unwrap(),
        original
    );

    let summary = record.summary.unwrap();
    assert_eq!(summary.content_discarded, 1);
    assert_eq!(summary.high_issues, 0);
}

#[tokio::test]
async fn test_empty_file_never_becomes_a_target() {
    let dir = repo(&[
        ("a.css", ".a { margin: 0; }"),
        ("b.css", ".b { margin: 0; }"),
        ("c.html", "<main></main>"),
        ("empty.css", ""),
    ]);
    let inventory = scan(dir.path(), &ScanOptions::default()).unwrap();
    assert_eq!(inventory.len(), 3);
    assert!(inventory.find(Path::new("empty.css")).is_none());

    let plan = plan_for(&["empty.css"]);
    let record = run(dir.path(), &[OPPORTUNITIES, &plan], &[]).await;

    assert!(record.error.is_none());
    assert_eq!(record.inventory.len(), 3);
    assert!(record.targets.is_empty());
    assert_eq!(record.phase, Phase::Complete);
    assert!(record.verification.is_none());
}

#[tokio::test]
async fn test_missing_repository_is_a_failed_run() {
    let dir = tempdir().unwrap();
    let record = run(&dir.path().join("absent"), &[], &[]).await;

    assert_eq!(record.phase, Phase::Complete);
    assert!(matches!(record.error, Some(RunError::Acquisition(_))));
    assert!(record.repo_dir.is_none());
    assert!(record.results.is_empty());
}

#[tokio::test]
async fn test_deleted_target_reports_file_not_found() {
    let dir = repo(&[("a.css", ".a{}"), ("b.css", ".b{}")]);
    let plan = plan_for(&["a.css", "b.css"]);
    let writer = Scripted::new(&[".a { color: teal; }", ".b { color: teal; }"]);
    let orch = Orchestrator::new(
        Box::new(LocalSource),
        Box::new(Handle(Scripted::new(&[OPPORTUNITIES, &plan]))),
        Box::new(Handle(writer)),
        WorkflowOptions::default(),
    );

    let mut record = RunRecord::new(RepoLocation::Local {
        path: dir.path().to_path_buf(),
    });
    while record.phase < Phase::Mutate {
        record = orch.step(record).await;
    }
    assert_eq!(record.phase, Phase::Mutate);
    fs::remove_file(dir.path().join("a.css")).unwrap();
    while !record.phase.is_terminal() {
        record = orch.step(record).await;
    }

    assert_eq!(record.results.len(), 2);
    assert_eq!(record.results[0].error, Some(MutationErrorKind::FileNotFound));
    assert!(!backup_path(&dir.path().join("a.css")).exists());
    assert!(record.results[1].success);
    assert_eq!(record.summary.unwrap().failed, 1);
}

#[tokio::test]
async fn test_recorded_run_can_be_reverted() {
    let dir = repo(&[
        ("src/theme.css", ":root { --bg: white; }\n"),
        ("src/nav.html", "<nav><a href=\"/\">Home</a></nav>\n"),
    ]);
    let plan = plan_for(&["src/theme.css", "src/nav.html"]);
    let record = run(
        dir.path(),
        &[OPPORTUNITIES, &plan],
        &[
            ":root { --bg: #0b0b0f; }\n",
            "<nav class=\"top\"><a href=\"/\">Home</a></nav>\n",
        ],
    )
    .await;
    assert!(record.error.is_none());
    assert_eq!(record.mutated_paths().len(), 2);

    let audit_dir = tempdir().unwrap();
    let audit = AuditLogger::new(audit_dir.path());
    audit.record_run(&record).unwrap();
    let latest = audit.latest_run().unwrap().unwrap();
    assert_eq!(latest, record);

    let repo_dir = latest.repo_dir.clone().unwrap();
    let report = revert_all(&repo_dir, &latest.mutated_paths());
    assert_eq!(report.reverted.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/theme.css")).unwrap(),
        ":root { --bg: white; }\n"
    );
    assert!(!backup_path(&dir.path().join("src/nav.html")).exists());
}

#[tokio::test]
async fn test_tampered_file_flagged_and_restored() {
    let dir = repo(&[("app.js", "export function go() { return 1; }\n")]);
    let plan = plan_for(&["app.js"]);
    let record = run(
        dir.path(),
        &[OPPORTUNITIES, &plan],
        &["export function go() { return 2; }\n"],
    )
    .await;
    assert!(record.error.is_none());

    // Broken after the run finished.
    fs::write(dir.path().join("app.js"), "export function go() { return 2; ]\n").unwrap();

    let report = verify_and_revert(dir.path(), &record.mutated_paths(), true);
    assert_eq!(report.count(Severity::High), 1);
    assert_eq!(report.reverted.reverted.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("app.js")).unwrap(),
        "export function go() { return 1; }\n"
    );
    assert!(!backup_path(&dir.path().join("app.js")).exists());
}
