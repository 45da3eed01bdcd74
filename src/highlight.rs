//! Grammar-driven highlighting
//!
//!     Text goes in with a language name (or none, for auto-detection) and a tree of
//!     classified spans comes out, together with a relevance score saying how well the
//!     grammar fit the text.
//!
//!     Pipeline
//!
//!         Grammar (data, YAML) -> compiler -> CompiledLanguage (arena of modes)
//!         text + CompiledLanguage -> tokenizer -> emitter -> Vec<Node> + relevance
//!
//!     The registry owns grammars and caches their compiled form; the highlighter is the
//!     public entry point and the detector loops it over candidate languages.
//!
//!     Modules
//!
//!     - grammar: the mode tree, common modes, YAML loading
//!     - compiler: mode tree to matchers (keywords, pattern, composer)
//!     - tokenizer: the scanning state machine
//!     - emitter: node tree construction and class names
//!     - registry: names, aliases and the compile cache
//!     - detect: best-of-n language detection
//!     - highlighter: `Highlighter` and its options and results
//!     - languages: bundled grammars
//!     - config: layered configuration
//!     - error: error types

pub mod compiler;
pub mod config;
pub mod detect;
pub mod emitter;
pub mod error;
pub mod grammar;
pub mod highlighter;
pub mod languages;
pub mod registry;
pub mod tokenizer;

/// Index of a compiled mode inside its language's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeId(pub usize);

impl ModeId {
    /// Every compiled language stores its root mode first.
    pub const ROOT: ModeId = ModeId(0);
}

pub use config::HighlightConfig;
pub use emitter::Node;
pub use error::{GrammarError, HighlightError};
pub use grammar::{Grammar, Mode};
pub use highlighter::{AutoOptions, HighlightOptions, HighlightResult, Highlighter, Illegals};
pub use registry::Registry;
