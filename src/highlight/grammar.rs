//! Grammar data model
//!
//!     A grammar is data, not code. It is a tree of [`Mode`]s: each mode says how a lexical
//!     region begins and ends, what it is called, which keywords live in it, and which other
//!     modes may open inside it. Nothing here knows how to match text; the compiler turns
//!     this tree into executable matchers and the tokenizer walks them.
//!
//!     Grammars are usually read from YAML (see [loader]), but every type can also be built
//!     in Rust with the chained setters on [`Mode`], which is how the common mode library in
//!     [modes] is written.
//!
//!     References
//!
//!     A `contains` entry (and a `starts` value) is a [`ModeRef`]: either an inline mode or a
//!     name. Names resolve, in order, to `self` (the containing mode), a key of the grammar's
//!     `definitions`, or a mode of the common library.

pub mod loader;
pub mod modes;

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Name used in `contains` to refer to the containing mode.
pub const SELF_REFERENCE: &str = "self";

/// A complete language definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Grammar {
    /// Human readable name ("JavaScript"); registration uses its own key
    pub name: Option<String>,
    pub aliases: Vec<String>,
    pub case_insensitive: bool,
    /// Named modes that `contains`/`starts` may reference by key
    pub definitions: BTreeMap<String, Mode>,
    /// The root mode. Its `begin`/`end` are ignored: the root spans the whole input.
    #[serde(flatten)]
    pub root: Mode,
}

impl Grammar {
    pub fn new(root: Mode) -> Self {
        Grammar {
            root,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    pub fn define(mut self, name: impl Into<String>, mode: Mode) -> Self {
        self.definitions.insert(name.into(), mode);
        self
    }
}

/// A rule node describing how to recognize and classify a lexical region.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mode {
    pub class_name: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    /// Shorthand: begin on any of these space separated words, which also become keywords
    pub begin_keywords: Option<String>,
    pub keywords: Option<Keywords>,
    /// Pattern used to split the buffer into keyword candidates (default `\w+`)
    pub lexemes: Option<String>,
    pub illegal: Option<String>,
    pub contains: Vec<ModeRef>,
    pub variants: Vec<Mode>,
    pub starts: Option<Box<ModeRef>>,
    pub ends_with_parent: bool,
    pub ends_parent: bool,
    pub exclude_begin: bool,
    pub exclude_end: bool,
    pub return_begin: bool,
    pub return_end: bool,
    pub skip: bool,
    pub end_same_as_begin: bool,
    pub relevance: Option<u32>,
    pub sub_language: Option<SubLanguage>,
}

/// Entry of a `contains` list, or a `starts` continuation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModeRef {
    /// `self`, a grammar definition, or a common mode name
    Named(String),
    Inline(Box<Mode>),
}

impl From<Mode> for ModeRef {
    fn from(mode: Mode) -> Self {
        ModeRef::Inline(Box::new(mode))
    }
}

impl From<&str> for ModeRef {
    fn from(name: &str) -> Self {
        ModeRef::Named(name.to_string())
    }
}

/// Keyword declaration of a mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    /// Space separated words, all classified as `keyword`
    Words(String),
    /// Class name to space separated words (`literal: "true false"`), in declaration
    /// order; a word listed under two classes takes the later one
    Classes(IndexMap<String, String>),
}

/// Embedded language of a mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SubLanguage {
    /// Always highlight the buffer as this language
    Name(String),
    /// Auto-detect among these candidates (empty: every registered language)
    Candidates(Vec<String>),
}

impl Mode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    pub fn begin(mut self, pattern: impl Into<String>) -> Self {
        self.begin = Some(pattern.into());
        self
    }

    pub fn end(mut self, pattern: impl Into<String>) -> Self {
        self.end = Some(pattern.into());
        self
    }

    pub fn begin_keywords(mut self, words: impl Into<String>) -> Self {
        self.begin_keywords = Some(words.into());
        self
    }

    pub fn keywords(mut self, words: impl Into<String>) -> Self {
        self.keywords = Some(Keywords::Words(words.into()));
        self
    }

    pub fn keyword_classes<I, K, V>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = classes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.keywords = Some(Keywords::Classes(map));
        self
    }

    pub fn lexemes(mut self, pattern: impl Into<String>) -> Self {
        self.lexemes = Some(pattern.into());
        self
    }

    pub fn illegal(mut self, pattern: impl Into<String>) -> Self {
        self.illegal = Some(pattern.into());
        self
    }

    pub fn contains<I, M>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ModeRef>,
    {
        self.contains.extend(modes.into_iter().map(Into::into));
        self
    }

    pub fn variants(mut self, variants: Vec<Mode>) -> Self {
        self.variants = variants;
        self
    }

    pub fn starts(mut self, mode: impl Into<ModeRef>) -> Self {
        self.starts = Some(Box::new(mode.into()));
        self
    }

    pub fn relevance(mut self, relevance: u32) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn sub_language(mut self, name: impl Into<String>) -> Self {
        self.sub_language = Some(SubLanguage::Name(name.into()));
        self
    }

    pub fn sub_language_candidates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_language = Some(SubLanguage::Candidates(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn ends_with_parent(mut self) -> Self {
        self.ends_with_parent = true;
        self
    }

    pub fn ends_parent(mut self) -> Self {
        self.ends_parent = true;
        self
    }

    pub fn exclude_begin(mut self) -> Self {
        self.exclude_begin = true;
        self
    }

    pub fn exclude_end(mut self) -> Self {
        self.exclude_end = true;
        self
    }

    pub fn return_begin(mut self) -> Self {
        self.return_begin = true;
        self
    }

    pub fn return_end(mut self) -> Self {
        self.return_end = true;
        self
    }

    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn end_same_as_begin(mut self) -> Self {
        self.end_same_as_begin = true;
        self
    }

    /// Class name, with the empty string treated as absent.
    pub fn scope(&self) -> Option<&str> {
        self.class_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Copy of `self` with every field `overlay` sets taking precedence.
    ///
    /// Flags only ever switch on. The result never carries variants.
    pub fn inherit(&self, overlay: &Mode) -> Mode {
        Mode {
            class_name: overlay.class_name.clone().or_else(|| self.class_name.clone()),
            begin: overlay.begin.clone().or_else(|| self.begin.clone()),
            end: overlay.end.clone().or_else(|| self.end.clone()),
            begin_keywords: overlay
                .begin_keywords
                .clone()
                .or_else(|| self.begin_keywords.clone()),
            keywords: overlay.keywords.clone().or_else(|| self.keywords.clone()),
            lexemes: overlay.lexemes.clone().or_else(|| self.lexemes.clone()),
            illegal: overlay.illegal.clone().or_else(|| self.illegal.clone()),
            contains: if overlay.contains.is_empty() {
                self.contains.clone()
            } else {
                overlay.contains.clone()
            },
            variants: Vec::new(),
            starts: overlay.starts.clone().or_else(|| self.starts.clone()),
            ends_with_parent: self.ends_with_parent || overlay.ends_with_parent,
            ends_parent: self.ends_parent || overlay.ends_parent,
            exclude_begin: self.exclude_begin || overlay.exclude_begin,
            exclude_end: self.exclude_end || overlay.exclude_end,
            return_begin: self.return_begin || overlay.return_begin,
            return_end: self.return_end || overlay.return_end,
            skip: self.skip || overlay.skip,
            end_same_as_begin: self.end_same_as_begin || overlay.end_same_as_begin,
            relevance: overlay.relevance.or(self.relevance),
            sub_language: overlay
                .sub_language
                .clone()
                .or_else(|| self.sub_language.clone()),
        }
    }

    /// One mode per variant, or the mode itself when it has none.
    pub fn expand_variants(&self) -> Vec<Mode> {
        if self.variants.is_empty() {
            vec![self.clone()]
        } else {
            self.variants
                .iter()
                .map(|variant| self.inherit(variant))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_overrides_set_fields() {
        let base = Mode::new()
            .class_name("string")
            .begin("'")
            .end("'")
            .relevance(0);
        let overlay = Mode::new().begin("\"").end("\"");

        let merged = base.inherit(&overlay);
        assert_eq!(merged.class_name.as_deref(), Some("string"));
        assert_eq!(merged.begin.as_deref(), Some("\""));
        assert_eq!(merged.end.as_deref(), Some("\""));
        assert_eq!(merged.relevance, Some(0));
    }

    #[test]
    fn test_expand_variants_clears_variants() {
        let mode = Mode::new().class_name("number").variants(vec![
            Mode::new().begin("0x[0-9a-f]+"),
            Mode::new().begin("\\d+").relevance(0),
        ]);

        let expanded = mode.expand_variants();
        assert_eq!(expanded.len(), 2);
        assert!(expanded.iter().all(|m| m.variants.is_empty()));
        assert!(expanded.iter().all(|m| m.scope() == Some("number")));
        assert_eq!(expanded[1].relevance, Some(0));
    }

    #[test]
    fn test_expand_without_variants_is_identity() {
        let mode = Mode::new().begin("a");
        assert_eq!(mode.expand_variants(), vec![mode]);
    }

    #[test]
    fn test_empty_class_name_is_no_scope() {
        let mode = Mode::new().class_name("");
        assert_eq!(mode.scope(), None);
    }

    #[test]
    fn test_flags_only_switch_on() {
        let base = Mode::new().exclude_end();
        let merged = base.inherit(&Mode::new().return_begin());
        assert!(merged.exclude_end);
        assert!(merged.return_begin);
    }
}
