//! Auto-Detector
//!
//! Highlights the text in every candidate language and keeps the two best by relevance.
//! Candidates that hit an illegal lexeme drop to relevance 0 rather than failing the call.
//! Comparisons are strict, so on a tie the earlier candidate wins.
//! When nothing scores above 0 the result has no language and holds the text as is.

use super::error::HighlightError;
use super::highlighter::{highlight_in, HighlightResult, Illegals};
use super::tokenizer::Context;

/// Best result over `subset` (every registered language when `None`).
pub fn detect(
    context: Context<'_>,
    text: &str,
    subset: Option<&[String]>,
) -> Result<HighlightResult, HighlightError> {
    let candidates = subset.unwrap_or_else(|| context.registry.list_names());

    // With no winner the text comes back unhighlighted
    let mut best = HighlightResult::plain(text);
    let mut second = HighlightResult::default();

    for name in candidates {
        if !context.registry.is_registered(name) {
            continue;
        }
        let (mut current, _) = highlight_in(context, name, text, Illegals::Fallback, None)?;
        current.language = Some(name.clone());
        tracing::debug!("Candidate {} scored {}", name, current.relevance);

        if current.relevance > best.relevance {
            second = std::mem::replace(&mut best, current);
        } else if current.relevance > second.relevance {
            second = current;
        }
    }

    if second.language.is_some() {
        best.second_best = Some(Box::new(second));
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::grammar::{Grammar, Mode};
    use crate::highlight::registry::Registry;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("alpha", Grammar::new(Mode::new().keywords("a b")));
        registry.register("beta", Grammar::new(Mode::new().keywords("b c d")));
        registry.register("gamma", Grammar::new(Mode::new().keywords("a").illegal("!")));
        registry
    }

    fn run(text: &str, subset: Option<&[String]>) -> HighlightResult {
        let registry = registry();
        detect(Context::new(&registry, "hljs-"), text, subset).unwrap()
    }

    #[test]
    fn test_best_and_second_best() {
        let result = run("b c d", None);
        assert_eq!(result.language.as_deref(), Some("beta"));
        assert_eq!(result.relevance, 3);
        let second = result.second_best.unwrap();
        assert_eq!(second.language.as_deref(), Some("alpha"));
        assert_eq!(second.relevance, 1);
    }

    #[test]
    fn test_ties_keep_the_first_candidate() {
        let result = run("a", None);
        assert_eq!(result.language.as_deref(), Some("alpha"));
        assert_eq!(result.second_best.unwrap().language.as_deref(), Some("gamma"));
    }

    #[test]
    fn test_illegal_candidates_score_zero() {
        let subset = vec!["gamma".to_string()];
        let result = run("a a!", Some(&subset));
        assert_eq!(result.language, None);
        assert_eq!(result.relevance, 0);
        assert_eq!(result.text(), "a a!");
    }

    #[test]
    fn test_unregistered_subset_entries_are_skipped() {
        let subset = vec!["nope".to_string(), "beta".to_string()];
        let result = run("d", Some(&subset));
        assert_eq!(result.language.as_deref(), Some("beta"));
    }

    #[test]
    fn test_nothing_scores() {
        let result = run("zzz", None);
        assert_eq!(result.language, None);
        assert_eq!(result.text(), "zzz");
        assert!(result.second_best.is_none());
    }
}
