//! Public entry points
//!
//! [`Highlighter`] owns a [`Registry`] and exposes the two operations of the crate:
//! highlighting in a named language and highlighting with language detection.

use super::config::HighlightConfig;
use super::detect;
use super::emitter::{text_of, Node, Root};
use super::error::{GrammarError, HighlightError};
use super::grammar::Grammar;
use super::languages;
use super::registry::Registry;
use super::tokenizer::{self, Context, Continuation};
use serde::{Deserialize, Serialize};

/// Class name prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "hljs-";

/// What to do when a mode's illegal pattern matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Illegals {
    /// Treat the lexeme as text and keep scanning
    #[default]
    Ignore,
    /// Give up on the grammar: the whole input as one text node, relevance 0
    Fallback,
    /// Return [`HighlightError::Illegal`]
    Raise,
}

/// Options for [`Highlighter::highlight`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub prefix: String,
    pub illegals: Illegals,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        HighlightOptions {
            prefix: DEFAULT_PREFIX.to_string(),
            illegals: Illegals::default(),
        }
    }
}

impl HighlightOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_illegals(mut self, illegals: Illegals) -> Self {
        self.illegals = illegals;
        self
    }
}

/// Options for [`Highlighter::highlight_auto`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoOptions {
    pub prefix: String,
    /// Candidate languages in order; `None` tries every registered language
    pub subset: Option<Vec<String>>,
}

impl Default for AutoOptions {
    fn default() -> Self {
        AutoOptions {
            prefix: DEFAULT_PREFIX.to_string(),
            subset: None,
        }
    }
}

impl AutoOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_subset<I, S>(mut self, subset: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subset = Some(subset.into_iter().map(Into::into).collect());
        self
    }
}

/// Outcome of a highlight call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResult {
    /// Language the text was highlighted as; `None` when no grammar fit
    pub language: Option<String>,
    pub relevance: u32,
    #[serde(rename = "value")]
    pub nodes: Vec<Node>,
    /// Set when a grammar was abandoned on an illegal lexeme
    pub illegal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_best: Option<Box<HighlightResult>>,
}

impl HighlightResult {
    /// The whole input as a single text node, relevance 0.
    pub fn plain(text: &str) -> Self {
        let mut nodes = Vec::new();
        super::emitter::append_text(&mut nodes, text);
        HighlightResult {
            nodes,
            ..Default::default()
        }
    }

    /// Concatenated text of every node; equals the input.
    pub fn text(&self) -> String {
        text_of(&self.nodes)
    }

    /// The nodes under a hast root, for serialization.
    pub fn to_root(&self) -> Root {
        Root {
            children: self.nodes.clone(),
        }
    }
}

/// Highlights text with registered grammars.
#[derive(Debug, Default)]
pub struct Highlighter {
    registry: Registry,
}

impl Highlighter {
    /// A highlighter with no languages.
    pub fn new() -> Self {
        Self::default()
    }

    /// A highlighter with every bundled language registered.
    pub fn with_defaults() -> Result<Self, GrammarError> {
        let mut highlighter = Self::new();
        for (name, grammar) in languages::bundled()? {
            highlighter.register(name, grammar);
        }
        Ok(highlighter)
    }

    /// A highlighter set up from configuration.
    pub fn from_config(config: &HighlightConfig) -> Result<Self, GrammarError> {
        if config.languages.bundled {
            Self::with_defaults()
        } else {
            Ok(Self::new())
        }
    }

    pub fn register(&mut self, name: impl Into<String>, grammar: Grammar) {
        self.registry.register(name, grammar);
    }

    pub fn register_alias<I, S>(&mut self, name: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register_alias(name, aliases);
    }

    pub fn register_aliases<I, N, A, S>(&mut self, map: I)
    where
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register_aliases(map);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Highlight `text` as the language `name` (a registered name or alias).
    pub fn highlight(
        &self,
        name: &str,
        text: &str,
        options: &HighlightOptions,
    ) -> Result<HighlightResult, HighlightError> {
        let context = Context::new(&self.registry, &options.prefix);
        let (result, _) = highlight_in(context, name, text, options.illegals, None)?;
        Ok(result)
    }

    /// Highlight `text` in whichever candidate language scores best.
    ///
    /// Unregistered subset entries are skipped. The runner-up is attached as
    /// `second_best` when there is one.
    pub fn highlight_auto(
        &self,
        text: &str,
        options: &AutoOptions,
    ) -> Result<HighlightResult, HighlightError> {
        let context = Context::new(&self.registry, &options.prefix);
        detect::detect(context, text, options.subset.as_deref())
    }
}

/// Resolve, compile and scan. Also returns where the scan stopped, for sublanguages that
/// continue in a later chunk; there is none after an illegal fallback.
pub(crate) fn highlight_in(
    context: Context<'_>,
    name: &str,
    text: &str,
    illegals: Illegals,
    resume: Option<Continuation>,
) -> Result<(HighlightResult, Option<Continuation>), HighlightError> {
    let language = context
        .registry
        .resolve(name)
        .ok_or_else(|| HighlightError::UnknownLanguage(name.to_string()))?;
    let compiled = language.compiled()?;

    match tokenizer::scan(context, compiled, text, illegals, resume) {
        Ok(scanned) => {
            let result = HighlightResult {
                language: Some(name.to_string()),
                relevance: scanned.relevance,
                nodes: scanned.nodes,
                illegal: false,
                second_best: None,
            };
            Ok((result, Some(scanned.continuation)))
        }
        Err(HighlightError::Illegal { lexeme, mode }) if illegals == Illegals::Fallback => {
            tracing::trace!("{} gave up on {:?} in {}", name, lexeme, mode);
            let result = HighlightResult {
                illegal: true,
                ..HighlightResult::plain(text)
            };
            Ok((result, None))
        }
        Err(err) => Err(err),
    }
}
