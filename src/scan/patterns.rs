//! Fixed lookup tables for the classifier.

use super::{Aspect, FileCategory};

/// Multi-part suffixes checked before the plain extension table.
pub const COMPOUND_SUFFIXES: &[(&str, FileCategory)] = &[
    (".styled.js", FileCategory::Style),
    (".styled.ts", FileCategory::Style),
    (".style.js", FileCategory::Style),
    (".animation.js", FileCategory::Animation),
    (".animation.ts", FileCategory::Animation),
    (".motion.js", FileCategory::Animation),
    (".motion.ts", FileCategory::Animation),
];

/// Extension to category, first match wins.
pub const EXTENSIONS: &[(FileCategory, &[&str])] = &[
    (
        FileCategory::Markup,
        &[".html", ".jsx", ".tsx", ".vue", ".svelte", ".astro", ".ejs"],
    ),
    (
        FileCategory::Style,
        &[".css", ".scss", ".sass", ".less"],
    ),
    (FileCategory::Script, &[".js", ".ts", ".mjs", ".cjs"]),
    (FileCategory::Animation, &[".lottie", ".riv"]),
    (FileCategory::Asset, &[".svg", ".jpg", ".png", ".webp"]),
];

/// Keyword sets per aspect, in tie-break order.
pub const ASPECT_KEYWORDS: &[(Aspect, &[&str])] = &[
    (
        Aspect::Theme,
        &["theme", "color", "palette", "dark", "light", "style", "brand"],
    ),
    (
        Aspect::Animation,
        &["animation", "transition", "motion", "gsap", "animate", "keyframe"],
    ),
    (
        Aspect::Layout,
        &["layout", "grid", "flex", "container", "responsive", "mobile"],
    ),
    (
        Aspect::Component,
        &["component", "button", "input", "form", "card", "modal", "dialog"],
    ),
    (
        Aspect::Navigation,
        &["nav", "menu", "link", "route", "path", "drawer", "sidebar"],
    ),
    (
        Aspect::Performance,
        &["performance", "loading", "lazy", "optimize", "cache"],
    ),
];

/// Weight of a keyword hit in the file path relative to one in the content.
pub const PATH_WEIGHT: usize = 3;

/// Files larger than this are not treated as UI sources.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;
