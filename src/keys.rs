//! Object key helpers.
//!
//! Object stores have a flat key space; folders are emulated with `/`
//! separated prefixes.

use glob::{MatchOptions, Pattern};

/// Normalize a folder prefix: blank becomes `""`, anything else gets a
/// trailing `/`.
pub fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix {
        None => String::new(),
        Some(p) if p.trim().is_empty() => String::new(),
        Some(p) if p.ends_with('/') => p.to_string(),
        Some(p) => format!("{p}/"),
    }
}

/// Display name of a child folder relative to its parent prefix.
pub fn folder_name_from_prefix(parent: &str, child: &str) -> String {
    let relative = child.strip_prefix(parent).unwrap_or(child);
    relative.strip_suffix('/').unwrap_or(relative).to_string()
}

/// Last path segment of a key.
pub fn extract_name(key: &str) -> &str {
    let trimmed = key.strip_suffix('/').unwrap_or(key);
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Directory marker objects (zero-byte keys ending with `/`).
pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Case-insensitive wildcard matcher where `*` matches any run of characters,
/// including `/`. Every other character is literal.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    pattern: Option<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

impl WildcardPattern {
    /// Compile a query. A blank query matches everything.
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self { pattern: None };
        }

        // Escape glob metacharacters so only `*` keeps its meaning.
        let escaped = query
            .split('*')
            .map(Pattern::escape)
            .collect::<Vec<_>>()
            .join("*");

        Self {
            pattern: Pattern::new(&escaped).ok(),
        }
    }

    /// Whether `text` matches the whole pattern.
    pub fn matches(&self, text: &str) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => pattern.matches_with(text, MATCH_OPTIONS),
        }
    }
}
