//! Glob-style matching over dotted qualified class names.
//!
//! Two wildcard forms are supported:
//! - `*` matches any run of characters within a single segment (never `.`)
//! - `**` as a segment matches zero or more whole segments, so
//!   `com.example.**.Foo` matches `com.example.Foo` and `com.example.a.b.Foo`

use regex::Regex;

/// A compiled qualified-name pattern.
///
/// Patterns without wildcards are matched by plain string equality; lookups
/// resolve them directly instead of scanning the index.
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    Exact,
    Glob(Regex),
}

impl NamePattern {
    pub fn compile(pattern: &str) -> Self {
        if !pattern.contains('*') {
            return Self {
                raw: pattern.to_string(),
                kind: PatternKind::Exact,
            };
        }

        let mut regex = String::from("^");
        let bytes = pattern.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if pattern[i..].starts_with("**") {
                if bytes.get(i + 2) == Some(&b'.') {
                    // `**.` consumes zero or more dot-terminated segments
                    regex.push_str("(.*\\.)?");
                    i += 3;
                } else {
                    // trailing `**` matches any remainder
                    regex.push_str(".*");
                    i += 2;
                }
            } else if bytes[i] == b'*' {
                regex.push_str("[^.]*");
                i += 1;
            } else {
                let ch = pattern[i..].chars().next().unwrap_or('\0');
                regex.push_str(&regex::escape(&ch.to_string()));
                i += ch.len_utf8();
            }
        }
        regex.push('$');

        // The translation only emits valid regex syntax, so this cannot fail
        // for any input pattern.
        let compiled = Regex::new(&regex).unwrap_or_else(|_| Regex::new("$^").unwrap());

        Self {
            raw: pattern.to_string(),
            kind: PatternKind::Glob(compiled),
        }
    }

    pub fn matches(&self, qualified_name: &str) -> bool {
        match &self.kind {
            PatternKind::Exact => self.raw == qualified_name,
            PatternKind::Glob(regex) => regex.is_match(qualified_name),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.kind, PatternKind::Exact)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
