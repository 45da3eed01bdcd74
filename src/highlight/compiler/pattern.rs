//! Compiled regular expressions
//!
//! Thin wrapper over Oniguruma (Ruby syntax). Searches take the whole text plus a byte
//! offset rather than a slice, so `\b`, `^` and lookbehind at the cursor still see the
//! text before it.

use crate::highlight::error::GrammarError;
use onig::{Regex, RegexOptions, Region, SearchOptions, Syntax};
use std::fmt;
use std::sync::Arc;

/// Matches at every word boundary and every non-boundary: an empty match anywhere.
pub const BOUNDARY: &str = r"\B|\b";

/// A compiled pattern that remembers its source.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Arc<Regex>,
}

impl Pattern {
    pub fn new(source: &str, case_insensitive: bool) -> Result<Self, GrammarError> {
        let mut options = RegexOptions::REGEX_OPTION_CAPTURE_GROUP;
        if case_insensitive {
            options |= RegexOptions::REGEX_OPTION_IGNORECASE;
        }
        let regex = Regex::with_options(source, options, Syntax::ruby()).map_err(|e| {
            GrammarError::InvalidPattern {
                pattern: source.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex: Arc::new(regex),
        })
    }

    /// A pattern matching `text` literally.
    pub fn literal(text: &str, case_insensitive: bool) -> Result<Self, GrammarError> {
        Self::new(&escape(text), case_insensitive)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Leftmost match at or after `from`, as a byte range.
    pub fn find_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let mut region = Region::new();
        self.search(text, from, &mut region)?;
        region.pos(0)
    }

    /// Leftmost match at or after `from`, with every capture group.
    pub fn search(&self, text: &str, from: usize, region: &mut Region) -> Option<usize> {
        if from > text.len() {
            return None;
        }
        self.regex.search_with_options(
            text,
            from,
            text.len(),
            SearchOptions::SEARCH_OPTION_NONE,
            Some(region),
        )
    }

    /// Whether the pattern matches starting exactly at `at`.
    pub fn matches_at(&self, text: &str, at: usize) -> bool {
        if at > text.len() {
            return false;
        }
        self.regex
            .match_with_options(text, at, SearchOptions::SEARCH_OPTION_NONE, None)
            .is_some()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// Escape regex metacharacters so `text` matches literally.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '-' | '/' | '\\' | '^' | '$' | '*' | '+' | '?' | '.' | '(' | ')' | '|' | '[' | ']'
                | '{' | '}'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_from_offset() {
        let pattern = Pattern::new(r"\d+", false).unwrap();
        assert_eq!(pattern.find_from("a1b22", 0), Some((1, 2)));
        assert_eq!(pattern.find_from("a1b22", 2), Some((3, 5)));
        assert_eq!(pattern.find_from("a1b22", 5), None);
        assert_eq!(pattern.find_from("a1b22", 9), None);
    }

    #[test]
    fn test_search_sees_text_before_offset() {
        // `\b` at offset 2 must know that "ab" continues into "cd"
        let pattern = Pattern::new(r"\bcd", false).unwrap();
        assert_eq!(pattern.find_from("abcd cd", 2), Some((5, 7)));
    }

    #[test]
    fn test_matches_at_is_anchored() {
        let pattern = Pattern::new(r"\*/", false).unwrap();
        assert!(pattern.matches_at("a */", 2));
        assert!(!pattern.matches_at("a */", 0));
    }

    #[test]
    fn test_boundary_matches_everywhere() {
        let pattern = Pattern::new(BOUNDARY, false).unwrap();
        assert!(pattern.matches_at("x;", 0));
        assert!(pattern.matches_at("x;", 1));
        assert!(pattern.matches_at("x;", 2));
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = Pattern::new("doctype", true).unwrap();
        assert_eq!(pattern.find_from("<!DOCTYPE", 0), Some((2, 9)));
    }

    #[test]
    fn test_backreference_and_lookahead() {
        let pattern = Pattern::new(r#"(['"])x\1(?=;)"#, false).unwrap();
        assert_eq!(pattern.find_from("'x'; \"x\";", 0), Some((0, 3)));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        assert_eq!(escape("a.b(c)"), r"a\.b\(c\)");
        let pattern = Pattern::literal("$$", false).unwrap();
        assert!(pattern.matches_at("x$$", 1));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new("(unclosed", false).unwrap_err();
        match err {
            GrammarError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
