//! Helpers for cleaning up generator output.

/// Extract the outermost JSON object from text that may contain other content.
///
/// Counts braces outside of JSON string literals, so values such as
/// `"use {} here"` do not end the object early.
pub fn extract_json_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove a surrounding Markdown code fence from generated file content.
///
/// Text before the first fence and after the closing fence is dropped.
/// Text with no fence is returned unchanged.
pub fn strip_code_fence(text: &str) -> String {
    let Some(open) = text.find("```") else {
        return text.to_string();
    };
    let after_open = &text[open + 3..];
    // Skip the info string (e.g. "tsx") up to the end of the fence line.
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    let body = match body.rfind("```") {
        Some(close) => &body[..close],
        None => body,
    };
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_simple() {
        let text = r#"{"key": "value"}"#;
        assert_eq!(extract_json_object(text), Some(text.to_string()));
    }

    #[test]
    fn test_extract_json_object_with_surrounding_text() {
        let text = r#"Here is the plan: {"key": "value"} hope it helps"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"key": "value"}"#.to_string())
        );
    }

    #[test]
    fn test_extract_json_object_nested() {
        let text = r#"{"outer": {"inner": "value"}}"#;
        assert_eq!(extract_json_object(text), Some(text.to_string()));
    }

    #[test]
    fn test_extract_json_object_ignores_braces_in_strings() {
        let text = r#"{"change": "wrap in { and \" }", "n": 1} trailing }"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"change": "wrap in { and \" }", "n": 1}"#.to_string())
        );
    }

    #[test]
    fn test_extract_json_object_none() {
        assert_eq!(extract_json_object("No JSON here"), None);
        assert_eq!(extract_json_object(r#"{"key": "value""#), None);
    }

    #[test]
    fn test_strip_code_fence_with_language() {
        let text = "Here you go:\n```tsx\nexport const A = 1;\n```\nDone.";
        assert_eq!(strip_code_fence(text), "export const A = 1;\n");
    }

    #[test]
    fn test_strip_code_fence_without_fence() {
        assert_eq!(strip_code_fence("a { }\n"), "a { }\n");
    }

    #[test]
    fn test_strip_code_fence_unterminated() {
        assert_eq!(strip_code_fence("```css\na { }\n"), "a { }\n");
    }
}
