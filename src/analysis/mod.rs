//! Analyze phase artifacts.
//!
//! [`analyze_capabilities`] reads a sample of the inventory and reports the
//! frameworks, libraries and techniques already in use. The generator then
//! turns that report into [`Opportunities`].

mod capabilities;

pub use capabilities::{
    AnimationSystem, CapabilityReport, ComponentArchitecture, Detection, ResponsiveDesign,
    SAMPLES_PER_ASPECT, ThemeSystem, analyze_capabilities,
};

use serde::{Deserialize, Serialize};

/// Enhancement opportunities proposed by the generator, grouped by theme.
///
/// Items are free-form JSON: the generator decides their shape, and the
/// workflow only forwards them into the plan prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunities {
    #[serde(default)]
    pub visual_design: Vec<serde_json::Value>,
    #[serde(default)]
    pub animations: Vec<serde_json::Value>,
    #[serde(default)]
    pub performance: Vec<serde_json::Value>,
    #[serde(default)]
    pub accessibility: Vec<serde_json::Value>,
    #[serde(default)]
    pub user_experience: Vec<serde_json::Value>,
    #[serde(default)]
    pub modernization: Vec<serde_json::Value>,
    #[serde(default)]
    pub prioritized_files: Vec<serde_json::Value>,
}

impl Opportunities {
    pub fn total(&self) -> usize {
        self.visual_design.len()
            + self.animations.len()
            + self.performance.len()
            + self.accessibility.len()
            + self.user_experience.len()
            + self.modernization.len()
    }
}

/// Analyze phase output stored on the run record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub capabilities: CapabilityReport,
    pub opportunities: Opportunities,
}
