//! Bracket-syntax tokenizer for route file names.
//!
//! A path segment such as `f[id(\d+)].json` is split into [`Part`]s:
//! literal text, and bracketed parameters with an optional `(...)` qualifier.
//! `[...rest]` marks a spread parameter that matches one or more segments.

use serde::Serialize;

use super::error::CompileError;

/// Characters a qualifier body may not contain
const RESERVED_QUALIFIER_CHARS: [char; 4] = ['(', ')', '?', ':'];

/// One token of a path segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    /// Literal text, or the parameter name as written (spreads keep their `...`)
    pub content: String,
    /// True for bracketed parameters
    pub dynamic: bool,
    /// Restricting sub-pattern, without the surrounding parentheses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// True for `[...name]` parameters
    pub spread: bool,
}

impl Part {
    /// A literal (static) part
    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            dynamic: false,
            qualifier: None,
            spread: false,
        }
    }

    /// Parameter name with any spread prefix removed
    #[must_use]
    pub fn param_name(&self) -> &str {
        self.content.strip_prefix("...").unwrap_or(&self.content)
    }
}

/// Parse a single path segment into its parts.
///
/// The segment itself is used as the file name in errors; the compiler calls
/// [`parse_segment`] to report the real route file instead.
///
/// # Example
///
/// ```rust
/// use fsrouter::manifest::parse;
///
/// let parts = parse(r"[id(\d+)]").unwrap();
/// assert_eq!(parts.len(), 1);
/// assert!(parts[0].dynamic);
/// assert_eq!(parts[0].qualifier.as_deref(), Some(r"\d+"));
///
/// assert!(parse("[a][b]").is_err());
/// ```
pub fn parse(segment: &str) -> Result<Vec<Part>, CompileError> {
    parse_segment(segment, segment)
}

/// Parse `segment`, naming `file` in any syntax error.
pub fn parse_segment(segment: &str, file: &str) -> Result<Vec<Part>, CompileError> {
    let mut parts: Vec<Part> = Vec::new();
    let mut pending = String::new();
    let mut rest = segment;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some((inner, consumed)) = bracket_group(after) else {
            // Unterminated or empty group: the bracket is literal text.
            pending.push_str(&rest[..=open]);
            rest = after;
            continue;
        };

        pending.push_str(&rest[..open]);
        if pending.is_empty() {
            if parts.last().is_some_and(|p| p.dynamic) {
                return Err(CompileError::AdjacentParameters {
                    file: file.to_string(),
                });
            }
        } else {
            parts.push(Part::literal(std::mem::take(&mut pending)));
        }

        parts.push(parameter(inner, file)?);
        rest = &after[consumed..];
    }

    pending.push_str(rest);
    if !pending.is_empty() {
        parts.push(Part::literal(pending));
    }

    Ok(parts)
}

/// Find the `]` closing a group opened just before `input`.
///
/// Brackets inside a parenthesised qualifier (`[id([0-9]{3})]`) do not close
/// the group. Returns the group body and the number of bytes consumed,
/// including the closing bracket.
fn bracket_group(input: &str) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ']' if depth == 0 => {
                if i == 0 {
                    return None;
                }
                return Some((&input[..i], i + 1));
            }
            _ => {}
        }
    }
    None
}

fn parameter(inner: &str, file: &str) -> Result<Part, CompileError> {
    let (content, qualifier) = match inner.find('(') {
        Some(idx) => (&inner[..idx], Some(&inner[idx..])),
        None => (inner, None),
    };

    if content.is_empty() || content == "..." {
        return Err(CompileError::InvalidParameter {
            file: file.to_string(),
        });
    }

    let qualifier = match qualifier {
        Some(q) => {
            let body = q
                .strip_prefix('(')
                .and_then(|q| q.strip_suffix(')'))
                .filter(|body| !body.is_empty())
                .ok_or_else(|| CompileError::IllegalQualifier {
                    file: file.to_string(),
                })?;
            if body.contains(RESERVED_QUALIFIER_CHARS) {
                return Err(CompileError::IllegalQualifier {
                    file: file.to_string(),
                });
            }
            Some(body.to_string())
        }
        None => None,
    };

    Ok(Part {
        content: content.to_string(),
        dynamic: true,
        qualifier,
        spread: content.starts_with("..."),
    })
}
