//! Compilation of parsed segments into anchored regular expressions.
//!
//! The string form of a compiled pattern is its identity: two routes whose
//! sources are equal match exactly the same paths, which is what clash
//! detection relies on.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use super::parts::Part;

/// Maximum number of capture groups stored inline before heap allocation.
/// Route trees rarely nest more than a handful of parameters.
pub const MAX_INLINE_CAPTURES: usize = 8;

/// Capture groups of a successful match; index 0 is the whole match.
pub type CaptureVec = SmallVec<[Option<String>; MAX_INLINE_CAPTURES]>;

/// Matcher for a single parameter segment
const PARAM_PATTERN: &str = "([^/]+?)";
/// Matcher for a spread parameter (one or more segments)
const SPREAD_PATTERN: &str = "(.+)";

/// A compiled route pattern
#[derive(Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    /// Compile `segments` into an anchored pattern.
    ///
    /// Parameters become capture groups in order of appearance, so the
    /// `n`th parameter of the route is capture group `n`. With
    /// `add_trailing_slash` the pattern also accepts one trailing `/`
    /// (except for the root pattern, which is always exactly `/`).
    pub fn compile(segments: &[Vec<Part>], add_trailing_slash: bool) -> Result<Self, regex::Error> {
        let source = Self::source(segments, add_trailing_slash);
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// Pattern source `segments` compile to, without building the regex
    #[must_use]
    pub fn source(segments: &[Vec<Part>], add_trailing_slash: bool) -> String {
        let path = segments
            .iter()
            .map(|segment| segment.iter().map(part_source).collect::<String>())
            .collect::<Vec<_>>()
            .join("/");

        let trailing = if add_trailing_slash && !segments.is_empty() {
            "/?$"
        } else {
            "$"
        };

        format!("^/{path}{trailing}")
    }

    /// Pattern source, used as the route's identity
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if `path` matches this pattern
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path`, returning all capture groups (group 0 is the whole match)
    #[must_use]
    pub fn exec(&self, path: &str) -> Option<CaptureVec> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RoutePattern {}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutePattern").field(&self.source).finish()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for RoutePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

fn part_source(part: &Part) -> String {
    if part.dynamic {
        return match (&part.qualifier, part.spread) {
            (Some(q), _) => format!("({q})"),
            (None, true) => SPREAD_PATTERN.to_string(),
            (None, false) => PARAM_PATTERN.to_string(),
        };
    }

    regex::escape(&encode_literal(&part.content))
}

/// URI-encode literal route text.
///
/// Mirrors `encodeURI`, then escapes `?` and `#` (which would otherwise
/// start a query or fragment) while leaving brackets readable.
pub(crate) fn encode_literal(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            '[' | ']' => out.push(c),
            c if is_uri_safe(c) => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    out
}

fn is_uri_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ';' | ',' | '/' | ':' | '@' | '&' | '=' | '+' | '$' | '-' | '_' | '.' | '!' | '~'
                | '*' | '\'' | '(' | ')'
        )
}
