//! Filetype-specific sanitization applied before validation.

use regex::Regex;
use std::sync::LazyLock;

use super::Dialect;

// Astro hydration directives, with an optional "..." / '...' / {...} value.
static ASTRO_CLIENT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[ \t]*client:(?:load|visible|only|media|idle)\b(?:=(?:"[^"]*"|'[^']*'|\{[^}]*\}))?"#,
    )
    .unwrap()
});

/// Result of [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub changed: bool,
    pub content: String,
}

/// Strip constructs that must never reach disk for the given dialect.
///
/// Only Astro has a rule today: generated `client:*` hydration directives are
/// removed along with their values.
pub fn sanitize(dialect: Dialect, content: &str) -> Sanitized {
    match dialect {
        Dialect::Astro => {
            let cleaned = ASTRO_CLIENT_DIRECTIVE.replace_all(content, "");
            Sanitized {
                changed: cleaned != content,
                content: cleaned.into_owned(),
            }
        }
        _ => Sanitized {
            changed: false,
            content: content.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_astro_directive_with_value_removed() {
        let input = r#"<Counter client:media="(max-width: 600px)" count={1} />"#;
        let out = sanitize(Dialect::Astro, input);
        assert!(out.changed);
        assert_eq!(out.content, "<Counter count={1} />");
    }

    #[test]
    fn test_astro_bare_directives_removed() {
        let input = "<Nav client:load />\n<Footer client:idle/>\n";
        let out = sanitize(Dialect::Astro, input);
        assert!(out.changed);
        assert_eq!(out.content, "<Nav />\n<Footer/>\n");
    }

    #[test]
    fn test_astro_single_quoted_and_expression_values_removed() {
        let input = "<A client:only='react' /><B client:visible={true} />";
        let out = sanitize(Dialect::Astro, input);
        assert!(out.changed);
        assert_eq!(out.content, "<A /><B />");
    }

    #[test]
    fn test_astro_without_directives_unchanged() {
        let input = "---\nconst title = 'Home';\n---\n<h1>{title}</h1>\n";
        let out = sanitize(Dialect::Astro, input);
        assert!(!out.changed);
        assert_eq!(out.content, input);
    }

    #[test]
    fn test_unknown_directive_names_are_kept() {
        let input = "<Widget client:loader />";
        let out = sanitize(Dialect::Astro, input);
        assert!(!out.changed);
    }

    #[test]
    fn test_other_dialects_untouched() {
        let input = r#"<Counter client:load />"#;
        let out = sanitize(Dialect::Script, input);
        assert!(!out.changed);
        assert_eq!(out.content, input);
    }
}
