//! # hilite
//!
//! A grammar-driven lexical highlighter. Source text is scanned against a declarative
//! grammar and comes back as a tree of classified spans plus a relevance score, which is
//! also what drives language auto-detection.
//!
//! ```rust,ignore
//! use hilite::highlight::{HighlightOptions, Highlighter};
//!
//! let highlighter = Highlighter::with_defaults()?;
//! let result = highlighter.highlight("java", "int x;", &HighlightOptions::default())?;
//! assert_eq!(result.text(), "int x;");
//! ```
//!
//! See the [highlight module](highlight) for the pipeline.

pub mod highlight;
