//! Grammar registry
//!
//! Languages are stored under a name and may be reached through any number of aliases.
//! Lookups are case-insensitive. Each language compiles its grammar on first use and keeps
//! the result; re-registering a name replaces the language, cache included.

use super::compiler::{compile, CompiledLanguage};
use super::error::GrammarError;
use super::grammar::Grammar;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// A registered grammar and its lazily compiled form.
#[derive(Debug)]
pub struct Language {
    name: String,
    grammar: Grammar,
    compiled: OnceCell<CompiledLanguage>,
}

impl Language {
    pub fn new(name: impl Into<String>, grammar: Grammar) -> Self {
        Language {
            name: name.into(),
            grammar,
            compiled: OnceCell::new(),
        }
    }

    /// Name the language was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Compile on first call; later calls return the cached result.
    ///
    /// A failed compile is not cached.
    pub fn compiled(&self) -> Result<&CompiledLanguage, GrammarError> {
        self.compiled.get_or_try_init(|| compile(&self.grammar))
    }
}

/// Registry of languages by name and alias
#[derive(Debug, Default)]
pub struct Registry {
    languages: HashMap<String, Language>,
    aliases: HashMap<String, String>,
    names: Vec<String>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grammar under `name`, together with the aliases it declares.
    ///
    /// If a language with the same name already exists, it will be replaced.
    pub fn register(&mut self, name: impl Into<String>, grammar: Grammar) {
        let name = name.into();
        let key = name.to_lowercase();
        let aliases = grammar.aliases.clone();

        if self.languages.contains_key(&key) {
            tracing::debug!("Replacing language {}", name);
        } else {
            tracing::debug!("Registering language {} ({} aliases)", name, aliases.len());
            self.names.push(name.clone());
        }
        self.languages.insert(key, Language::new(name.clone(), grammar));

        self.register_alias(&name, aliases);
    }

    /// Point each of `aliases` at `name`. Empty aliases are ignored.
    pub fn register_alias<I, S>(&mut self, name: &str, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let target = name.to_lowercase();
        for alias in aliases {
            let alias = alias.as_ref();
            if alias.is_empty() {
                continue;
            }
            self.aliases.insert(alias.to_lowercase(), target.clone());
        }
    }

    /// Bulk form of [`register_alias`](Self::register_alias): name to aliases.
    pub fn register_aliases<I, N, A, S>(&mut self, map: I)
    where
        I: IntoIterator<Item = (N, A)>,
        N: AsRef<str>,
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (name, aliases) in map {
            self.register_alias(name.as_ref(), aliases);
        }
    }

    /// Look up a name, then an alias, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&Language> {
        let key = name.to_lowercase();
        self.languages.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|target| self.languages.get(target))
        })
    }

    /// Check if a name or alias resolves
    pub fn is_registered(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Registered names (not aliases), in registration order
    pub fn list_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::grammar::Mode;

    fn grammar(aliases: &[&str]) -> Grammar {
        Grammar::new(Mode::new().keywords("x")).aliases(aliases.iter().copied())
    }

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("anything").is_none());
    }

    #[test]
    fn test_register_with_declared_aliases() {
        let mut registry = Registry::new();
        registry.register("javascript", grammar(&["js", "jsx"]));
        assert_eq!(registry.resolve("js").unwrap().name(), "javascript");
        assert!(registry.is_registered("jsx"));
        assert_eq!(registry.list_names(), &["javascript".to_string()]);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut registry = Registry::new();
        registry.register("Markdown", grammar(&["MD"]));
        assert!(registry.is_registered("markdown"));
        assert!(registry.is_registered("md"));
        assert!(registry.is_registered("MARKDOWN"));
        assert_eq!(registry.list_names(), &["Markdown".to_string()]);
    }

    #[test]
    fn test_register_alias_forms() {
        let mut registry = Registry::new();
        registry.register("markdown", grammar(&[]));
        registry.register("python", grammar(&[]));
        registry.register_alias("markdown", ["mkd"]);
        registry.register_aliases([("python", vec!["py3", "", "pyw"])]);

        assert_eq!(registry.resolve("mkd").unwrap().name(), "markdown");
        assert_eq!(registry.resolve("pyw").unwrap().name(), "python");
        assert!(!registry.is_registered(""));
    }

    #[test]
    fn test_names_win_over_aliases() {
        let mut registry = Registry::new();
        registry.register("c", grammar(&[]));
        registry.register("cpp", grammar(&["c"]));
        assert_eq!(registry.resolve("c").unwrap().name(), "c");
    }

    #[test]
    fn test_re_register_replaces_without_duplicating() {
        let mut registry = Registry::new();
        registry.register("x", grammar(&[]));
        registry.register("x", Grammar::new(Mode::new().keywords("y")));
        assert_eq!(registry.len(), 1);
        let language = registry.resolve("x").unwrap();
        assert_eq!(language.grammar().root.keywords, Mode::new().keywords("y").keywords);
    }

    #[test]
    fn test_alias_before_language() {
        let mut registry = Registry::new();
        registry.register_alias("later", ["l8r"]);
        assert!(!registry.is_registered("l8r"));
        registry.register("later", grammar(&[]));
        assert!(registry.is_registered("l8r"));
    }

    #[test]
    fn test_compiled_is_cached() {
        let mut registry = Registry::new();
        registry.register("x", grammar(&[]));
        let language = registry.resolve("x").unwrap();
        let first = language.compiled().unwrap() as *const CompiledLanguage;
        let second = language.compiled().unwrap() as *const CompiledLanguage;
        assert_eq!(first, second);
    }

    #[test]
    fn test_compile_errors_surface() {
        let mut registry = Registry::new();
        registry.register("bad", Grammar::new(Mode::new().contains(["missing"])));
        let err = registry.resolve("bad").unwrap().compiled().unwrap_err();
        assert_eq!(err, GrammarError::UnknownMode("missing".into()));
    }
}
