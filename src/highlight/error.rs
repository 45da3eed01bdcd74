//! Error types for grammar compilation and highlighting
//!
//! Usage errors and grammar errors are returned to the caller. Illegal lexemes
//! only surface here when the caller asked for [`Illegals::Raise`]; every other
//! policy handles them inside the tokenizer.
//!
//! [`Illegals::Raise`]: crate::highlight::highlighter::Illegals::Raise

use std::fmt;

/// Problems found while loading or compiling a grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// A begin/end/illegal/lexemes pattern was rejected by the regex engine
    InvalidPattern { pattern: String, message: String },
    /// A `contains` or `starts` reference names no definition or common mode
    UnknownMode(String),
    /// The grammar document could not be deserialized
    Parse(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern `{}`: {}", pattern, message)
            }
            GrammarError::UnknownMode(name) => write!(f, "Unknown mode reference `{}`", name),
            GrammarError::Parse(msg) => write!(f, "Grammar parse error: {}", msg),
        }
    }
}

impl std::error::Error for GrammarError {}

impl From<serde_yaml::Error> for GrammarError {
    fn from(err: serde_yaml::Error) -> Self {
        GrammarError::Parse(err.to_string())
    }
}

/// Error returned by [`Highlighter::highlight`] and [`Highlighter::highlight_auto`].
///
/// [`Highlighter::highlight`]: crate::highlight::highlighter::Highlighter::highlight
/// [`Highlighter::highlight_auto`]: crate::highlight::highlighter::Highlighter::highlight_auto
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightError {
    /// The language name resolves to neither a registered name nor an alias
    UnknownLanguage(String),
    /// An illegal lexeme was found while illegals were set to raise
    Illegal { lexeme: String, mode: String },
    /// The grammar failed to compile
    Grammar(GrammarError),
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(name) => {
                write!(f, "Unknown language: `{}` is not registered", name)
            }
            HighlightError::Illegal { lexeme, mode } => {
                write!(f, "Illegal lexeme \"{}\" for mode \"{}\"", lexeme, mode)
            }
            HighlightError::Grammar(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Grammar(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GrammarError> for HighlightError {
    fn from(err: GrammarError) -> Self {
        HighlightError::Grammar(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_message() {
        let err = HighlightError::UnknownLanguage("fooscript".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown language: `fooscript` is not registered"
        );
    }

    #[test]
    fn test_illegal_message() {
        let err = HighlightError::Illegal {
            lexeme: "#".to_string(),
            mode: "<unnamed>".to_string(),
        };
        assert_eq!(err.to_string(), "Illegal lexeme \"#\" for mode \"<unnamed>\"");
    }

    #[test]
    fn test_grammar_error_is_source() {
        use std::error::Error;

        let err: HighlightError = GrammarError::UnknownMode("nope".to_string()).into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Unknown mode reference `nope`");
    }
}
