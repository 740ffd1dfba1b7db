//! Deterministic component identifiers and preload detection.

use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\\/]index").expect("index suffix regex should be valid"));
static EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\w+$").expect("extension regex should be valid"));
static PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^(]+)(?:\([^(]+\))?\]").expect("parameter regex should be valid")
});
static PRELOAD_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:(?:async\s+)?function\s*\*?\s*preload\b|(?:const|let|var)\s+preload\b)")
        .expect("preload export regex should be valid")
});
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<style\b[^>]*>.*?</style>").expect("style block regex should be valid")
});

/// Identifiers that cannot be used verbatim as generated binding names
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Derive a component name from its route file path.
///
/// `blog/index.html` → `blog`, `blog/[slug].html` → `blog_$slug`,
/// `#.html` → `$35`. Names that collide with reserved words get a trailing
/// underscore.
#[must_use]
pub fn component_name(file: &str) -> String {
    let name = INDEX_SUFFIX.replace(file, "");
    let name = name.replace(['/', '\\'], "_");
    let name = EXTENSION.replace(&name, "");
    let name = PARAMETER.replace(&name, "$$$1");

    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$' => out.push(c),
            '.' => out.push('_'),
            c => {
                out.push('$');
                out.push_str(&(c as u32).to_string());
            }
        }
    }

    if RESERVED_WORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// True if a component's source exports a module-level `preload`.
#[must_use]
pub fn source_has_preload(source: &str) -> bool {
    if !source.contains("preload") {
        return false;
    }
    let stripped = STYLE_BLOCK.replace_all(source, "");
    PRELOAD_EXPORT.is_match(&stripped)
}
