//! Grammar loading
//!
//! Grammars are YAML documents deserialized straight into [`Grammar`]. Patterns are best
//! written as single-quoted YAML strings so backslashes reach the regex engine untouched:
//!
//! ```yaml
//! aliases: [ini-ish]
//! keywords: "true false"
//! contains:
//!   - hash_comment
//!   - className: section
//!     begin: '^\['
//!     end: '\]'
//! ```

use super::Grammar;
use crate::highlight::error::GrammarError;
use std::fs;
use std::path::Path;

/// Parse a grammar from YAML source.
pub fn from_yaml(source: &str) -> Result<Grammar, GrammarError> {
    Ok(serde_yaml::from_str(source)?)
}

/// Read and parse a grammar file.
pub fn from_path(path: impl AsRef<Path>) -> Result<Grammar, GrammarError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|e| GrammarError::Parse(format!("{}: {}", path.display(), e)))?;
    from_yaml(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::grammar::{Keywords, ModeRef, SubLanguage};

    #[test]
    fn test_parses_root_fields_and_references() {
        let grammar = from_yaml(
            r#"
name: Demo
aliases: [dm]
caseInsensitive: true
keywords: "let in"
illegal: '#'
contains:
  - self
  - c_line_comment
  - className: string
    begin: '"'
    end: '"'
    relevance: 0
"#,
        )
        .unwrap();

        assert_eq!(grammar.name.as_deref(), Some("Demo"));
        assert_eq!(grammar.aliases, vec!["dm"]);
        assert!(grammar.case_insensitive);
        assert_eq!(grammar.root.keywords, Some(Keywords::Words("let in".into())));
        assert_eq!(grammar.root.illegal.as_deref(), Some("#"));
        assert_eq!(grammar.root.contains.len(), 3);
        assert_eq!(grammar.root.contains[0], ModeRef::Named("self".into()));
        match &grammar.root.contains[2] {
            ModeRef::Inline(mode) => {
                assert_eq!(mode.scope(), Some("string"));
                assert_eq!(mode.relevance, Some(0));
            }
            other => panic!("expected inline mode, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_keyword_classes_and_sublanguages() {
        let grammar = from_yaml(
            r#"
keywords:
  keyword: "if else"
  literal: "true false"
contains:
  - begin: '<'
    end: '>'
    subLanguage: xml
  - begin: '\{'
    end: '\}'
    subLanguage: [css, xml]
"#,
        )
        .unwrap();

        match grammar.root.keywords {
            Some(Keywords::Classes(map)) => {
                assert_eq!(map["literal"], "true false");
                assert_eq!(map.keys().collect::<Vec<_>>(), vec!["keyword", "literal"]);
            }
            other => panic!("expected keyword classes, got {:?}", other),
        }
        let subs: Vec<_> = grammar
            .root
            .contains
            .iter()
            .map(|entry| match entry {
                ModeRef::Inline(mode) => mode.sub_language.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(subs[0], Some(SubLanguage::Name("xml".into())));
        assert_eq!(
            subs[1],
            Some(SubLanguage::Candidates(vec!["css".into(), "xml".into()]))
        );
    }

    #[test]
    fn test_definitions() {
        let grammar = from_yaml(
            r#"
definitions:
  subst:
    className: subst
    begin: '\$\{'
    end: '\}'
contains: [subst]
"#,
        )
        .unwrap();
        assert!(grammar.definitions.contains_key("subst"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = from_yaml("contains: [").unwrap_err();
        assert!(matches!(err, GrammarError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, GrammarError::Parse(_)));
    }
}
