//! Regex Composer
//!
//!     Most regex engines only report *that* a top-level alternation matched, not *which*
//!     branch did. Capture groups do reveal it, so the composer wraps every sub-pattern in
//!     its own group, joins them with `|`, and remembers the group number each sub-pattern
//!     starts at. After a match, the first participating wrapper group names the branch.
//!
//!     Concatenating independently written patterns shifts their group numbers, so every
//!     backreference `\N` inside a sub-pattern is renumbered by the number of groups that
//!     precede it in the combined pattern. Character classes are skipped whole and `(?`
//!     groups are not counted, so neither disturbs the bookkeeping.
//!
//!     This is the only place in the crate that edits pattern source text.

use super::pattern::Pattern;
use crate::highlight::error::GrammarError;
use crate::highlight::ModeId;
use once_cell::sync::Lazy;
use onig::Region;
use regex::Regex;

/// Tokens of a pattern source that matter for group bookkeeping: a character class, an
/// opening group (plain or `(?`), a backreference, or any other escape.
static PATTERN_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:[^\\\]]|\\.)*\]|\(\??|\\([1-9]\d*)|\\.").unwrap());

/// Result of composing several patterns into one alternation.
#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    pub source: String,
    /// Group number of the wrapper group of each input pattern, in input order
    pub group_starts: Vec<usize>,
}

/// Join `patterns` into a single alternation, renumbering backreferences.
pub fn compose<S: AsRef<str>>(patterns: &[S]) -> Composed {
    let mut captures = 0;
    let mut source = String::new();
    let mut group_starts = Vec::with_capacity(patterns.len());

    for (index, pattern) in patterns.iter().enumerate() {
        let expression = pattern.as_ref();
        captures += 1;
        let offset = captures;
        group_starts.push(offset);

        if index != 0 {
            source.push('|');
        }
        source.push('(');

        let mut last = 0;
        for token in PATTERN_TOKEN.captures_iter(expression) {
            let whole = token.get(0).expect("group 0 always participates");
            source.push_str(&expression[last..whole.start()]);
            last = whole.end();

            match token.get(1) {
                Some(number) => {
                    let n: usize = number.as_str().parse().unwrap_or(0);
                    source.push('\\');
                    source.push_str(&(n + offset).to_string());
                }
                None => {
                    source.push_str(whole.as_str());
                    if whole.as_str() == "(" {
                        captures += 1;
                    }
                }
            }
        }
        source.push_str(&expression[last..]);
        source.push(')');
    }

    Composed {
        source,
        group_starts,
    }
}

/// What a terminator match means for the mode being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// A contained mode begins
    Begin(ModeId),
    /// The mode (or an ancestor it ends with) ends
    End,
    /// Text that may never appear in the mode
    Illegal,
}

/// A terminator match found by [`Terminators::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminatorMatch {
    pub start: usize,
    pub end: usize,
    pub rule: Rule,
}

impl TerminatorMatch {
    pub fn lexeme<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// The composed matcher of one mode: every child begin, the inherited end, and illegal.
#[derive(Debug, Clone)]
pub struct Terminators {
    pattern: Option<Pattern>,
    rules: Vec<(usize, Rule)>,
}

impl Terminators {
    pub fn new(rules: Vec<(Rule, String)>, case_insensitive: bool) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Ok(Terminators {
                pattern: None,
                rules: Vec::new(),
            });
        }
        let sources: Vec<&str> = rules.iter().map(|(_, source)| source.as_str()).collect();
        let composed = compose(&sources);
        let pattern = Pattern::new(&composed.source, case_insensitive)?;
        let rules = composed
            .group_starts
            .into_iter()
            .zip(rules.into_iter().map(|(rule, _)| rule))
            .collect();
        Ok(Terminators {
            pattern: Some(pattern),
            rules,
        })
    }

    /// Next boundary at or after `from`, or `None` when the mode has nothing left to find.
    pub fn find(&self, text: &str, from: usize) -> Option<TerminatorMatch> {
        let pattern = self.pattern.as_ref()?;
        let mut region = Region::new();
        pattern.search(text, from, &mut region)?;
        let (start, end) = region.pos(0)?;
        let rule = self
            .rules
            .iter()
            .find(|(group, _)| region.pos(*group).is_some())
            .map(|(_, rule)| *rule)?;
        Some(TerminatorMatch { start, end, rule })
    }

    pub fn source(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::source)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_and_joins() {
        let composed = compose(&["a", "b+", "c"]);
        assert_eq!(composed.source, "(a)|(b+)|(c)");
        assert_eq!(composed.group_starts, vec![1, 2, 3]);
    }

    #[test]
    fn test_inner_groups_shift_following_starts() {
        let composed = compose(&["(x)(y)", "z"]);
        assert_eq!(composed.source, "((x)(y))|(z)");
        assert_eq!(composed.group_starts, vec![1, 4]);
    }

    #[test]
    fn test_backreferences_are_renumbered() {
        let composed = compose(&["(a)\\1", "(['\"])x\\1"]);
        assert_eq!(composed.source, "((a)\\2)|((['\"])x\\4)");
        assert_eq!(composed.group_starts, vec![1, 3]);
    }

    #[test]
    fn test_non_capturing_groups_and_classes_are_not_counted() {
        let composed = compose(&["(?:a)(?=b)[(]\\(", "(c)\\1"]);
        assert_eq!(composed.source, "((?:a)(?=b)[(]\\()|((c)\\3)");
        assert_eq!(composed.group_starts, vec![1, 2]);
    }

    #[test]
    fn test_escaped_bracket_inside_class() {
        let composed = compose(&["[\\]()]", "(d)"]);
        assert_eq!(composed.group_starts, vec![1, 2]);
    }

    #[test]
    fn test_terminators_identify_rule() {
        let terminators = Terminators::new(
            vec![
                (Rule::Begin(ModeId(3)), "(['\"])".to_string()),
                (Rule::End, ";".to_string()),
                (Rule::Illegal, "#".to_string()),
            ],
            false,
        )
        .unwrap();

        let found = terminators.find("ab 'c';#", 0).unwrap();
        assert_eq!(found.rule, Rule::Begin(ModeId(3)));
        assert_eq!((found.start, found.end), (3, 4));

        let found = terminators.find("ab 'c';#", 6).unwrap();
        assert_eq!(found.rule, Rule::End);
        assert_eq!(found.lexeme("ab 'c';#"), ";");

        let found = terminators.find("ab 'c';#", 7).unwrap();
        assert_eq!(found.rule, Rule::Illegal);
    }

    #[test]
    fn test_empty_terminators_never_match() {
        let terminators = Terminators::new(Vec::new(), false).unwrap();
        assert!(terminators.is_empty());
        assert!(terminators.find("anything", 0).is_none());
    }

    #[test]
    fn test_renumbered_backreference_still_matches() {
        let terminators = Terminators::new(
            vec![
                (Rule::Begin(ModeId(1)), "(x)y".to_string()),
                (Rule::Begin(ModeId(2)), "(['\"]).*?\\1".to_string()),
            ],
            false,
        )
        .unwrap();
        let text = "say 'hi' now";
        let found = terminators.find(text, 0).unwrap();
        assert_eq!(found.rule, Rule::Begin(ModeId(2)));
        assert_eq!(found.lexeme(text), "'hi'");
    }
}
