//! Heuristic detection of the UI stack already in use.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::scan::{Aspect, Inventory};

/// Files read per aspect.
pub const SAMPLES_PER_ASPECT: usize = 5;

/// Minimum share of sampled files (percent, exclusive) for a detection to count.
const CONFIDENCE_THRESHOLD: u32 = 20;

type PatternTable = LazyLock<Vec<(&'static str, Regex)>>;

fn table(entries: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
    entries
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(&format!("(?is){}", pattern)).unwrap()))
        .collect()
}

static FRAMEWORKS: PatternTable = LazyLock::new(|| {
    table(&[
        ("react", r#"import\s+React|from\s+['"]react['"]|ReactDOM|useState|useEffect"#),
        ("vue", r#"import\s+Vue|from\s+['"]vue['"]|createApp|<template>|<script setup>"#),
        ("angular", r#"import\s+\{\s*Component\s*\}|@Component|@Angular|NgModule"#),
        ("svelte", r#"<script>.*?</script>.*?<style|from\s+['"]svelte['"]"#),
        ("astro", r#"---.*?---.*?<html|from\s+['"]astro['"]"#),
        (
            "nextjs",
            r#"import\s+\{\s*useRouter\s*\}\s+from\s+['"]next/router['"]|nextjs|getStaticProps"#,
        ),
        ("nuxt", r#"from\s+['"]nuxt['"]|defineNuxtConfig|useNuxtApp"#),
    ])
});

static UI_LIBRARIES: PatternTable = LazyLock::new(|| {
    table(&[
        (
            "tailwind",
            r#"tailwind|className=['"][^'"]*(flex|grid|bg-|text-|p-|m-|rounded)[^'"]*['"]"#,
        ),
        (
            "bootstrap",
            r#"bootstrap|class=['"][^'"]*(btn|container|row|col|navbar)[^'"]*['"]"#,
        ),
        ("material-ui", r"@mui|@material-ui|makeStyles|createTheme|ThemeProvider"),
        ("chakra-ui", r"@chakra-ui|ChakraProvider|useDisclosure"),
        ("styled-components", r"styled\.|createGlobalStyle|css`|styled\([^)]+\)`"),
        ("framer-motion", r"framer-motion|motion\.|animate|useAnimation|AnimatePresence"),
        ("gsap", r"gsap|TweenMax|TimelineMax|ScrollTrigger"),
        ("three", r"three\.js|THREE\.|Scene|WebGLRenderer|PerspectiveCamera"),
    ])
});

static ANIMATION_KINDS: PatternTable = LazyLock::new(|| {
    table(&[
        ("css", r"@keyframes|animation:|transition:|transform:"),
        ("js", r"requestAnimationFrame|animate\(|\.to\(|\.from\(|\.fromTo\("),
        ("libraries", r"gsap|anime\.|motion\.|framer|lottie|velocity"),
    ])
});

static MEDIA_QUERY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@media\s*\([^)]+\)").unwrap());

static BREAKPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(max|min)-width:\s*(\d+)(px|rem|em)").unwrap());

static CUSTOM_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--[a-zA-Z0-9_-]+:").unwrap());

/// Detected names with their confidence (percent of sampled files).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub detected: Vec<String>,
    pub confidence: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSystem {
    pub types: Vec<String>,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSystem {
    #[serde(rename = "type")]
    pub kind: String,
    pub capabilities: Vec<String>,
}

impl Default for ThemeSystem {
    fn default() -> Self {
        Self {
            kind: "unknown".to_string(),
            capabilities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveDesign {
    pub approach: String,
    pub breakpoints: Vec<String>,
}

impl Default for ResponsiveDesign {
    fn default() -> Self {
        Self {
            approach: "unknown".to_string(),
            breakpoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentArchitecture {
    pub pattern: String,
    /// Component-aspect files as a percentage of `.jsx`/`.tsx` files
    pub reusability: u32,
}

impl Default for ComponentArchitecture {
    fn default() -> Self {
        Self {
            pattern: "unknown".to_string(),
            reusability: 0,
        }
    }
}

/// What the sampled files say about the existing UI stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub sampled_files: usize,
    pub framework: Detection,
    pub ui_libraries: Detection,
    pub animation_system: AnimationSystem,
    pub theme_system: ThemeSystem,
    pub responsive_design: ResponsiveDesign,
    pub component_architecture: ComponentArchitecture,
    pub performance_techniques: Vec<String>,
}

#[derive(Default)]
struct Counts {
    frameworks: BTreeMap<&'static str, usize>,
    libraries: BTreeMap<&'static str, usize>,
    animations: BTreeMap<&'static str, usize>,
}

fn count_matches(
    table: &[(&'static str, Regex)],
    content: &str,
    counts: &mut BTreeMap<&'static str, usize>,
) {
    for (name, regex) in table {
        if regex.is_match(content) {
            *counts.entry(*name).or_default() += 1;
        }
    }
}

/// Sample up to [`SAMPLES_PER_ASPECT`] files per aspect and build a report.
///
/// Unreadable or non-UTF-8 files are skipped and do not count toward the
/// sample size.
pub fn analyze_capabilities(repo_dir: &Path, inventory: &Inventory) -> CapabilityReport {
    let mut report = CapabilityReport::default();
    let mut counts = Counts::default();
    let mut media_queries = Vec::new();
    let mut techniques = BTreeSet::new();

    let samples = Aspect::ALL
        .iter()
        .flat_map(|aspect| inventory.by_aspect(*aspect).take(SAMPLES_PER_ASPECT));

    for entry in samples {
        let Ok(content) = fs::read_to_string(repo_dir.join(&entry.path)) else {
            debug!(path = %entry.path.display(), "skipping unreadable sample");
            continue;
        };
        report.sampled_files += 1;

        count_matches(&FRAMEWORKS, &content, &mut counts.frameworks);
        count_matches(&UI_LIBRARIES, &content, &mut counts.libraries);
        count_matches(&ANIMATION_KINDS, &content, &mut counts.animations);

        if matches!(entry.extension.as_str(), ".css" | ".scss" | ".less") {
            media_queries.extend(MEDIA_QUERY.find_iter(&content).map(|m| m.as_str().to_string()));
            if CUSTOM_PROPERTY.is_match(&content) {
                report.theme_system.kind = "css-variables".to_string();
                if report.theme_system.capabilities.is_empty() {
                    report.theme_system.capabilities.push("custom-properties".to_string());
                }
            }
        }

        if content.contains("loading=") || content.contains("lazy") {
            techniques.insert("lazy-loading");
        }
        if content.contains("preload") || content.contains("prefetch") {
            techniques.insert("resource-hints");
        }
    }

    report.framework = detection(&FRAMEWORKS, &counts.frameworks, report.sampled_files);
    report.ui_libraries = detection(&UI_LIBRARIES, &counts.libraries, report.sampled_files);
    report.performance_techniques = techniques.into_iter().map(String::from).collect();

    for (name, _) in ANIMATION_KINDS.iter() {
        if counts.animations.get(name).copied().unwrap_or(0) > 0 {
            report.animation_system.types.push(name.to_string());
        }
    }
    report.animation_system.capabilities = animation_capabilities(&report, &counts);

    if !media_queries.is_empty() {
        let breakpoints: BTreeSet<String> = media_queries
            .iter()
            .flat_map(|q| BREAKPOINT.captures_iter(q))
            .map(|c| format!("{}-width-{}{}", &c[1], &c[2], &c[3]))
            .collect();
        report.responsive_design = ResponsiveDesign {
            approach: "media-queries".to_string(),
            breakpoints: breakpoints.into_iter().collect(),
        };
    } else if has(&report.ui_libraries, "tailwind") {
        report.responsive_design.approach = "utility-classes".to_string();
    }

    if has(&report.framework, "react") {
        report.component_architecture = component_architecture(inventory);
    }

    info!(
        sampled = report.sampled_files,
        frameworks = ?report.framework.detected,
        libraries = ?report.ui_libraries.detected,
        "capability analysis complete"
    );
    report
}

fn detection(
    table: &[(&'static str, Regex)],
    counts: &BTreeMap<&'static str, usize>,
    sampled: usize,
) -> Detection {
    let mut out = Detection::default();
    if sampled == 0 {
        return out;
    }
    // Table order keeps the detected list stable across runs.
    for (name, _) in table {
        let count = counts.get(name).copied().unwrap_or(0);
        let confidence = ((count * 100) as f64 / sampled as f64).round().min(100.0) as u32;
        if count > 0 && (count * 100) > CONFIDENCE_THRESHOLD as usize * sampled {
            out.detected.push(name.to_string());
            out.confidence.insert(name.to_string(), confidence);
        }
    }
    out
}

fn has(detection: &Detection, name: &str) -> bool {
    detection.detected.iter().any(|d| d == name)
}

fn animation_capabilities(report: &CapabilityReport, counts: &Counts) -> Vec<String> {
    let caps: &[&str] = if has(&report.ui_libraries, "gsap") {
        &["timeline", "advanced-easing", "scroll-triggered"]
    } else if has(&report.ui_libraries, "framer-motion") {
        &["declarative", "gesture-based", "variants"]
    } else if counts.animations.get("css").copied().unwrap_or(0) > 0 {
        &["css-based"]
    } else if counts.animations.get("js").copied().unwrap_or(0) > 0 {
        &["javascript-based"]
    } else {
        &[]
    };
    caps.iter().map(|c| c.to_string()).collect()
}

fn component_architecture(inventory: &Inventory) -> ComponentArchitecture {
    let components = inventory.by_aspect(Aspect::Component).count();
    let markup = inventory
        .iter()
        .filter(|e| matches!(e.extension.as_str(), ".jsx" | ".tsx"))
        .count();
    if markup == 0 {
        return ComponentArchitecture::default();
    }
    let reusability = ((components * 100) as f64 / markup as f64).round().min(100.0) as u32;
    let pattern = match reusability {
        r if r > 70 => "highly-componentized",
        r if r > 40 => "moderately-componentized",
        _ => "low-componentization",
    };
    ComponentArchitecture {
        pattern: pattern.to_string(),
        reusability,
    }
}
