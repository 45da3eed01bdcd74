//! Bundled languages
//!
//! Grammar files under `grammars/` are embedded at build time and parsed on request.
//! Registration order is the order of [`BUNDLED`], which is also the order auto-detection
//! tries them in.

use super::error::GrammarError;
use super::grammar::{loader, Grammar};

/// Name and YAML source of every bundled grammar.
pub const BUNDLED: &[(&str, &str)] = &[
    ("javascript", include_str!("../../grammars/javascript.yaml")),
    ("java", include_str!("../../grammars/java.yaml")),
    ("json", include_str!("../../grammars/json.yaml")),
    ("xml", include_str!("../../grammars/xml.yaml")),
    ("css", include_str!("../../grammars/css.yaml")),
    ("markdown", include_str!("../../grammars/markdown.yaml")),
    ("python", include_str!("../../grammars/python.yaml")),
    ("bash", include_str!("../../grammars/bash.yaml")),
    ("plaintext", include_str!("../../grammars/plaintext.yaml")),
];

/// Every bundled grammar, parsed.
pub fn bundled() -> Result<Vec<(&'static str, Grammar)>, GrammarError> {
    BUNDLED
        .iter()
        .map(|(name, source)| Ok((*name, loader::from_yaml(source)?)))
        .collect()
}

/// Parse one bundled grammar; `None` if no grammar has that name.
pub fn load(name: &str) -> Option<Result<Grammar, GrammarError>> {
    BUNDLED
        .iter()
        .find(|(bundled, _)| *bundled == name)
        .map(|(_, source)| loader::from_yaml(source))
}
