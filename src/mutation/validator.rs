//! Balanced-delimiter validation.
//!
//! A conservative syntax gate: checks that `()`, `[]` and `{}` nest
//! correctly and reports the exact `line:column` of the first problem.
//! Script files additionally get a best-effort repair for `if (` headers that
//! lost their closing parenthesis.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::Dialect;

// `if (cond {` with no `)` between the opening paren and the block brace.
static IF_HEADER_MISSING_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bif(\s*)\(([^(){};\n]*?)(\s*)\{").unwrap());

/// What went wrong (or what was repaired) in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnexpectedClosing { found: char },
    Mismatched { expected: char, found: char },
    Unclosed { open: char },
    /// An auto-fix was produced; the returned content carries it.
    Fixed { repairs: usize },
}

/// A validation finding anchored at a 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    /// Short kebab-case code for the finding.
    pub fn code(&self) -> &'static str {
        match self.kind {
            DiagnosticKind::UnexpectedClosing { .. } => "unexpected-closing",
            DiagnosticKind::Mismatched { .. } => "mismatched",
            DiagnosticKind::Unclosed { .. } => "unclosed",
            DiagnosticKind::Fixed { .. } => "fixed",
        }
    }

    /// True for findings that have no auto-fix attached.
    pub fn is_hard_error(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::Fixed { .. })
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::UnexpectedClosing { found } => write!(
                f,
                "unexpected-closing '{}' at {}:{}",
                found, self.line, self.column
            ),
            DiagnosticKind::Mismatched { expected, found } => write!(
                f,
                "mismatched: expected '{}' but found '{}' at {}:{}",
                expected, found, self.line, self.column
            ),
            DiagnosticKind::Unclosed { open } => {
                write!(f, "unclosed '{}' at {}:{}", open, self.line, self.column)
            }
            DiagnosticKind::Fixed { repairs } => write!(
                f,
                "fixed {} if-header(s) missing ')' starting at {}:{}",
                repairs, self.line, self.column
            ),
        }
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// The input unchanged, or the repaired buffer when `diagnostic` is `Fixed`.
    pub content: String,
    pub diagnostic: Option<Diagnostic>,
}

impl Validation {
    fn passed(content: &str) -> Self {
        Self {
            valid: true,
            content: content.to_string(),
            diagnostic: None,
        }
    }

    /// True when an auto-fixed buffer was returned.
    pub fn has_fix(&self) -> bool {
        self.diagnostic
            .as_ref()
            .is_some_and(|d| matches!(d.kind, DiagnosticKind::Fixed { .. }))
    }
}

/// Validate `content` as the body of the file at `path`.
pub fn validate(path: &Path, content: &str) -> Validation {
    let Some(diagnostic) = scan_delimiters(content) else {
        return Validation::passed(content);
    };

    if Dialect::from_path(path) == Dialect::Script
        && let Some((fixed, repairs, offset)) = fix_if_headers(content)
    {
        let (line, column) = line_column(content, offset);
        return Validation {
            valid: false,
            content: fixed,
            diagnostic: Some(Diagnostic {
                kind: DiagnosticKind::Fixed { repairs },
                line,
                column,
            }),
        };
    }

    Validation {
        valid: false,
        content: content.to_string(),
        diagnostic: Some(diagnostic),
    }
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Return the first delimiter problem in `content`, if any.
fn scan_delimiters(content: &str) -> Option<Diagnostic> {
    let mut stack: Vec<(char, usize, usize)> = Vec::new();
    let mut line = 1;
    let mut column = 0;

    for ch in content.chars() {
        if ch == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        column += 1;

        match ch {
            '(' | '[' | '{' => stack.push((ch, line, column)),
            ')' | ']' | '}' => match stack.pop() {
                None => {
                    return Some(Diagnostic {
                        kind: DiagnosticKind::UnexpectedClosing { found: ch },
                        line,
                        column,
                    });
                }
                Some((open, _, _)) if closer_for(open) != ch => {
                    return Some(Diagnostic {
                        kind: DiagnosticKind::Mismatched {
                            expected: closer_for(open),
                            found: ch,
                        },
                        line,
                        column,
                    });
                }
                Some(_) => {}
            },
            _ => {}
        }
    }

    // Earliest opener still on the stack.
    stack.first().map(|&(open, line, column)| Diagnostic {
        kind: DiagnosticKind::Unclosed { open },
        line,
        column,
    })
}

/// Insert the missing `)` into every broken `if (` header.
/// Returns the repaired text, the number of repairs and the byte offset of the first.
fn fix_if_headers(content: &str) -> Option<(String, usize, usize)> {
    let first = IF_HEADER_MISSING_PAREN.find(content)?;
    let repairs = IF_HEADER_MISSING_PAREN.find_iter(content).count();
    let fixed = IF_HEADER_MISSING_PAREN
        .replace_all(content, "if${1}(${2})${3}{")
        .into_owned();
    Some((fixed, repairs, first.start()))
}

fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
