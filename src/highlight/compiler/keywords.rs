//! Keyword tables
//!
//! A mode's keyword declaration flattens into a lookup table from word to class name and
//! relevance score. Words may carry an explicit score (`word|3`); otherwise filler words
//! that appear in every language score 0 and everything else scores 1.

use crate::highlight::grammar::Keywords;
use std::collections::HashMap;

/// Words too common across languages to count as evidence for any of them.
pub const COMMON_KEYWORDS: &[&str] = &["of", "and", "for", "in", "not", "or", "if", "then"];

/// Class name given to words declared as a plain string.
pub const DEFAULT_KEYWORD_CLASS: &str = "keyword";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub class_name: String,
    pub relevance: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTable {
    entries: HashMap<String, Keyword>,
    case_insensitive: bool,
}

impl KeywordTable {
    pub fn compile(keywords: &Keywords, case_insensitive: bool) -> Self {
        let mut table = KeywordTable {
            entries: HashMap::new(),
            case_insensitive,
        };
        match keywords {
            Keywords::Words(words) => table.flatten(DEFAULT_KEYWORD_CLASS, words),
            Keywords::Classes(classes) => {
                for (class_name, words) in classes {
                    table.flatten(class_name, words);
                }
            }
        }
        table
    }

    fn flatten(&mut self, class_name: &str, words: &str) {
        let words = if self.case_insensitive {
            words.to_lowercase()
        } else {
            words.to_string()
        };
        for entry in words.split_whitespace() {
            let (word, score) = match entry.split_once('|') {
                Some((word, score)) => (word, score.parse::<u32>().ok()),
                None => (entry, None),
            };
            let relevance = score.unwrap_or_else(|| default_relevance(word));
            self.entries.insert(
                word.to_string(),
                Keyword {
                    class_name: class_name.to_string(),
                    relevance,
                },
            );
        }
    }

    /// Look up a lexeme, folding case when the grammar is case-insensitive.
    pub fn get(&self, lexeme: &str) -> Option<&Keyword> {
        if self.case_insensitive {
            self.entries.get(&lexeme.to_lowercase())
        } else {
            self.entries.get(lexeme)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_relevance(word: &str) -> u32 {
    let lower = word.to_lowercase();
    if COMMON_KEYWORDS.contains(&lower.as_str()) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_plain_words_are_keywords() {
        let table = KeywordTable::compile(&Keywords::Words("public void".into()), false);
        assert_eq!(table.len(), 2);
        let keyword = table.get("void").unwrap();
        assert_eq!(keyword.class_name, "keyword");
        assert_eq!(keyword.relevance, 1);
        assert!(table.get("Void").is_none());
    }

    #[test]
    fn test_common_words_score_zero() {
        let table = KeywordTable::compile(&Keywords::Words("in of while".into()), false);
        assert_eq!(table.get("in").unwrap().relevance, 0);
        assert_eq!(table.get("of").unwrap().relevance, 0);
        assert_eq!(table.get("while").unwrap().relevance, 1);
    }

    #[test]
    fn test_explicit_score_overrides() {
        let table = KeywordTable::compile(&Keywords::Words("defer|10 if|2 nil|0".into()), false);
        assert_eq!(table.get("defer").unwrap().relevance, 10);
        assert_eq!(table.get("if").unwrap().relevance, 2);
        assert_eq!(table.get("nil").unwrap().relevance, 0);
    }

    #[test]
    fn test_unparsable_score_falls_back_to_default() {
        let table = KeywordTable::compile(&Keywords::Words("of|x go|".into()), false);
        assert_eq!(table.get("of").unwrap().relevance, 0);
        assert_eq!(table.get("go").unwrap().relevance, 1);
    }

    #[test]
    fn test_classes() {
        let mut classes = IndexMap::new();
        classes.insert("keyword".to_string(), "if else".to_string());
        classes.insert("literal".to_string(), "true false".to_string());
        let table = KeywordTable::compile(&Keywords::Classes(classes), false);
        assert_eq!(table.get("true").unwrap().class_name, "literal");
        assert_eq!(table.get("else").unwrap().class_name, "keyword");
    }

    #[test]
    fn test_later_class_wins_for_repeated_words() {
        let mut classes = IndexMap::new();
        classes.insert("literal".to_string(), "null".to_string());
        classes.insert("built_in".to_string(), "null print".to_string());
        let table = KeywordTable::compile(&Keywords::Classes(classes), false);
        assert_eq!(table.get("null").unwrap().class_name, "built_in");

        let mut classes = IndexMap::new();
        classes.insert("built_in".to_string(), "null print".to_string());
        classes.insert("literal".to_string(), "null".to_string());
        let table = KeywordTable::compile(&Keywords::Classes(classes), false);
        assert_eq!(table.get("null").unwrap().class_name, "literal");
    }

    #[test]
    fn test_case_insensitive_folds_both_sides() {
        let table = KeywordTable::compile(&Keywords::Words("SELECT From".into()), true);
        assert!(table.get("select").is_some());
        assert!(table.get("FROM").is_some());
        assert!(table.get("Select").is_some());
    }
}
