//! Prompt templates sent to the generators.
//!
//! - **Opportunities prompt**: inventory summary + capability report, asks for JSON
//! - **Plan prompt**: opportunities + candidate files, asks for an enhancement plan
//! - **Content prompt**: one target file, asks for the full replacement content

use crate::analysis::{CapabilityReport, Opportunities};
use crate::mutation::MutationOutcome;
use crate::scan::{Inventory, InventorySummary};

use super::plan::Target;

/// Candidate files listed in the plan prompt.
const PLAN_FILE_LISTING: usize = 40;

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Ask for enhancement opportunities as a JSON object.
pub fn build_opportunities_prompt(summary: &InventorySummary, report: &CapabilityReport) -> String {
    let mut prompt = String::new();
    prompt.push_str("# UI Enhancement Opportunities\n\n");
    prompt.push_str(
        "You are reviewing the user interface of a web project. Using the inventory and \
         capability report below, identify concrete opportunities to improve it.\n\n",
    );

    prompt.push_str("## Inventory\n\n```json\n");
    prompt.push_str(&pretty(summary));
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Detected capabilities\n\n```json\n");
    prompt.push_str(&pretty(report));
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Response format\n\n");
    prompt.push_str(
        "Reply with a single JSON object and nothing else. Keys: `visual_design`, \
         `animations`, `performance`, `accessibility`, `user_experience`, `modernization` \
         (arrays of short findings) and `prioritized_files` (array of repository-relative \
         paths, most valuable first). Only mention files that appear in the inventory.\n",
    );
    prompt
}

/// Ask for a plan with per-file modifications.
pub fn build_plan_prompt(inventory: &Inventory, opportunities: &Opportunities) -> String {
    let mut prompt = String::new();
    prompt.push_str("# UI Enhancement Plan\n\n");
    prompt.push_str(
        "Turn the opportunities below into an enhancement plan. Each file modification must \
         name an existing file from the candidate list.\n\n",
    );

    prompt.push_str("## Opportunities\n\n```json\n");
    prompt.push_str(&pretty(opportunities));
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Candidate files\n\n");
    for entry in inventory.iter().take(PLAN_FILE_LISTING) {
        prompt.push_str(&format!(
            "- `{}` ({}, {})\n",
            entry.path.display(),
            entry.category,
            entry.aspect
        ));
    }
    if inventory.len() > PLAN_FILE_LISTING {
        prompt.push_str(&format!(
            "- ... and {} more\n",
            inventory.len() - PLAN_FILE_LISTING
        ));
    }
    prompt.push('\n');

    prompt.push_str("## Response format\n\n");
    prompt.push_str(
        "Reply with a single JSON object and nothing else:\n\n\
         ```json\n\
         {\n  \"title\": \"...\",\n  \"description\": \"...\",\n  \"changes\": [\"...\"],\n  \
         \"file_modifications\": [\n    {\"path\": \"src/App.css\", \"enhancement_type\": \
         \"visual_design\", \"description\": \"...\"}\n  ]\n}\n\
         ```\n",
    );
    prompt
}

/// Ask for the complete new content of one target.
///
/// `previous` holds the outcomes of earlier targets in this run so the
/// generator can keep changes consistent across files.
pub fn build_content_prompt(target: &Target, original: &str, previous: &[MutationOutcome]) -> String {
    let entry = &target.entry;
    let mut prompt = String::new();
    prompt.push_str(&format!("# Enhance `{}`\n\n", entry.path.display()));
    prompt.push_str(&format!("- **Category**: {}\n", entry.category));
    prompt.push_str(&format!("- **Aspect**: {}\n", entry.aspect));
    prompt.push_str(&format!("- **Enhancement**: {}\n", target.enhancement_type));
    prompt.push_str(&format!("- **Planned change**: {}\n\n", target.planned_change));

    if !previous.is_empty() {
        prompt.push_str("## Already processed in this run\n\n");
        for outcome in previous {
            let status = match (&outcome.error, outcome.content_discarded) {
                (Some(kind), _) => format!("failed ({})", kind),
                (None, true) => "kept original (invalid output)".to_string(),
                (None, false) => "updated".to_string(),
            };
            prompt.push_str(&format!(
                "- `{}` [{}]: {}\n",
                outcome.path.display(),
                outcome.enhancement_type,
                status
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Current content\n\n```\n");
    prompt.push_str(original);
    if !original.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("```\n\n");

    prompt.push_str("## Instructions\n\n");
    prompt.push_str(
        "Return the complete new content of the file in a single fenced code block. Keep \
         existing behavior intact, keep every bracket balanced, and do not add files or \
         imports that do not exist. Return an empty reply to leave the file unchanged.\n",
    );
    prompt
}
