//! Phased enhancement workflow.
//!
//! A run moves one [`RunRecord`] through
//! `Discover -> Classify -> Analyze -> Plan -> Mutate* -> Verify -> Summarize -> Complete`.

pub mod orchestrator;
pub mod plan;
pub mod prompts;
pub mod record;

pub use orchestrator::{DEFAULT_MAX_TARGETS, Orchestrator, WorkflowOptions};
pub use plan::{EnhancementPlan, PlannedModification, Skipped, Target, select_targets};
pub use record::{Phase, RunRecord, RunSummary};
