//! Grammar Compiler
//!
//!     Turns a [`Grammar`]'s mode tree into a [`CompiledLanguage`]: a flat arena of
//!     [`CompiledMode`]s addressed by [`ModeId`], root first. Modes refer to their children
//!     and continuations by id, so a mode that contains itself (directly through `self`, or
//!     through a named definition) is a cycle through the index rather than an infinitely
//!     deep clone.
//!
//!     Each mode is compiled in two passes:
//!     1. prepare: everything that only depends on the mode and its parent's termination
//!        source (keywords, lexemes, begin/end sources, the end pattern, flags).
//!     2. link: resolve `contains` and `starts` to ids (compiling them as needed) and build
//!        the composed terminator matcher over the children's begins, the inherited end
//!        and the illegal pattern.
//!
//!     Preparing every variant of a reference before linking any of them means a child that
//!     refers back to a mode still being linked always finds its begin pattern ready.
//!
//!     Sharing
//!
//!     A named reference compiles once per language and is shared by every user. A mode that
//!     depends on its parent (it `endsWithParent`, directly or through its `starts` chain)
//!     folds the parent's end into its own terminators, so it is shared only between parents
//!     with the same inherited end. A reference is recorded before its children are linked,
//!     which is what ends the recursion of self-referencing definitions. Inline modes are
//!     compiled per occurrence.
//!
//!     A parent-dependent reference met again below its own copy, through parents that all
//!     end with it, would otherwise inherit a longer end at every level (`\)`, `\)|\)`, ...).
//!     It resolves to that enclosing copy instead, as plain recursion does.

pub mod composer;
pub mod keywords;
pub mod pattern;

use self::composer::{Rule, Terminators};
use self::keywords::KeywordTable;
use self::pattern::{Pattern, BOUNDARY};
use super::error::GrammarError;
use super::grammar::{modes, Grammar, Keywords, Mode, ModeRef, SubLanguage, SELF_REFERENCE};
use super::ModeId;
use std::collections::HashMap;

/// Lexeme pattern used for keyword lookup when a mode declares none.
pub const DEFAULT_LEXEMES: &str = r"\w+";

/// How many `starts` hops are followed when checking whether a mode depends on its parent.
const MAX_STARTS_CHAIN: usize = 64;

/// How the buffer of a mode is turned into nodes when it is flushed.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Emitted as text
    Plain,
    /// Split into lexemes, each looked up in the table
    Keywords { table: KeywordTable, lexemes: Pattern },
    /// Highlighted recursively as another language
    SubLanguage(SubLanguage),
}

/// A mode ready for scanning.
#[derive(Debug, Clone)]
pub struct CompiledMode {
    pub class_name: Option<String>,
    pub dispatch: Dispatch,
    /// Begin source; `None` only for the root
    pub begin: Option<String>,
    pub begin_keywords: bool,
    /// Pattern tested at an end candidate; `None` when the mode only ends with its parent
    pub end: Option<Pattern>,
    /// This mode's end source joined with every ancestor end it inherits
    pub terminator_end: String,
    pub ends_with_parent: bool,
    pub ends_parent: bool,
    pub exclude_begin: bool,
    pub exclude_end: bool,
    pub return_begin: bool,
    pub return_end: bool,
    pub skip: bool,
    pub end_same_as_begin: bool,
    pub relevance: u32,
    pub contains: Vec<ModeId>,
    pub starts: Option<ModeId>,
    pub terminators: Terminators,
}

impl CompiledMode {
    /// Label used in illegal-lexeme errors.
    pub fn display_name(&self) -> &str {
        self.class_name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn is_sub_language(&self) -> bool {
        matches!(self.dispatch, Dispatch::SubLanguage(_))
    }
}

/// The executable form of a grammar.
#[derive(Debug, Clone)]
pub struct CompiledLanguage {
    pub case_insensitive: bool,
    modes: Vec<CompiledMode>,
}

impl CompiledLanguage {
    pub fn root(&self) -> &CompiledMode {
        &self.modes[ModeId::ROOT.0]
    }

    pub fn mode(&self, id: ModeId) -> &CompiledMode {
        &self.modes[id.0]
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Compile `grammar`. Every pattern is validated here, so a grammar that compiles never
/// fails at scan time.
pub fn compile(grammar: &Grammar) -> Result<CompiledLanguage, GrammarError> {
    let mut compiler = Compiler {
        grammar,
        case_insensitive: grammar.case_insensitive,
        modes: Vec::new(),
        named: HashMap::new(),
        linking: Vec::new(),
    };

    let root = without_variants(&grammar.root);
    let ids = compiler.prepare_all(std::slice::from_ref(&root), None)?;
    compiler.link_all(&ids, std::slice::from_ref(&root), None)?;

    tracing::debug!(
        "Compiled grammar {} ({} modes)",
        grammar.name.as_deref().unwrap_or("<anonymous>"),
        compiler.modes.len()
    );

    Ok(CompiledLanguage {
        case_insensitive: grammar.case_insensitive,
        modes: compiler.modes,
    })
}

/// Key of a named reference: the name, whether its variants were expanded, and the
/// inherited end it was compiled under (empty for modes that ignore it; `None` outside any
/// parent).
type RefKey = (String, bool, Option<String>);

struct Compiler<'g> {
    grammar: &'g Grammar,
    case_insensitive: bool,
    modes: Vec<CompiledMode>,
    named: HashMap<RefKey, Vec<ModeId>>,
    /// Parent-dependent references being linked, outermost first
    linking: Vec<(String, bool, Vec<ModeId>)>,
}

impl<'g> Compiler<'g> {
    fn prepare_all(
        &mut self,
        modes: &[Mode],
        parent_end: Option<&str>,
    ) -> Result<Vec<ModeId>, GrammarError> {
        let mut ids = Vec::with_capacity(modes.len());
        for mode in modes {
            let compiled = self.prepare(mode, parent_end)?;
            ids.push(ModeId(self.modes.len()));
            self.modes.push(compiled);
        }
        Ok(ids)
    }

    fn link_all(
        &mut self,
        ids: &[ModeId],
        modes: &[Mode],
        parent_end: Option<&str>,
    ) -> Result<(), GrammarError> {
        for (id, mode) in ids.iter().zip(modes) {
            self.link(*id, mode, parent_end)?;
        }
        Ok(())
    }

    /// Everything but children, continuation and terminators. `parent_end` is `None` for
    /// the root, which has no begin or end of its own.
    fn prepare(&self, mode: &Mode, parent_end: Option<&str>) -> Result<CompiledMode, GrammarError> {
        let ci = self.case_insensitive;

        let keywords = mode
            .keywords
            .clone()
            .or_else(|| mode.begin_keywords.clone().map(Keywords::Words));
        let dispatch = match (&mode.sub_language, keywords) {
            (Some(sub_language), _) => Dispatch::SubLanguage(sub_language.clone()),
            (None, Some(keywords)) => Dispatch::Keywords {
                table: KeywordTable::compile(&keywords, ci),
                lexemes: Pattern::new(mode.lexemes.as_deref().unwrap_or(DEFAULT_LEXEMES), ci)?,
            },
            (None, None) => Dispatch::Plain,
        };

        let mut begin = None;
        let mut end = None;
        let mut terminator_end = String::new();

        if let Some(parent_end) = parent_end {
            let begin_source = match &mode.begin_keywords {
                Some(words) => format!(
                    r"\b({})\b",
                    words.split_whitespace().collect::<Vec<_>>().join("|")
                ),
                None => non_empty(&mode.begin).unwrap_or_else(|| BOUNDARY.to_string()),
            };
            // Validated here so a bad begin names itself rather than the parent's terminators
            Pattern::new(&begin_source, ci)?;

            let end_source = if mode.end_same_as_begin {
                Some(begin_source.clone())
            } else if non_empty(&mode.end).is_some() {
                non_empty(&mode.end)
            } else if !mode.ends_with_parent {
                Some(BOUNDARY.to_string())
            } else {
                None
            };

            if let Some(source) = &end_source {
                end = Some(Pattern::new(source, ci)?);
                terminator_end.push_str(source);
            }
            if mode.ends_with_parent && !parent_end.is_empty() {
                if end_source.is_some() {
                    terminator_end.push('|');
                }
                terminator_end.push_str(parent_end);
            }
            begin = Some(begin_source);
        }

        Ok(CompiledMode {
            class_name: mode.scope().map(str::to_string),
            dispatch,
            begin,
            begin_keywords: mode.begin_keywords.is_some(),
            end,
            terminator_end,
            ends_with_parent: mode.ends_with_parent,
            ends_parent: mode.ends_parent,
            exclude_begin: mode.exclude_begin,
            exclude_end: mode.exclude_end,
            return_begin: mode.return_begin,
            return_end: mode.return_end,
            skip: mode.skip,
            end_same_as_begin: mode.end_same_as_begin,
            relevance: mode.relevance.unwrap_or(1),
            contains: Vec::new(),
            starts: None,
            terminators: Terminators::new(Vec::new(), ci)?,
        })
    }

    fn link(
        &mut self,
        id: ModeId,
        mode: &Mode,
        parent_end: Option<&str>,
    ) -> Result<(), GrammarError> {
        let own_end = self.modes[id.0].terminator_end.clone();

        let mut contains = Vec::new();
        for reference in &mode.contains {
            contains.extend(self.resolve(reference, id, Some(&own_end), true)?);
        }

        // A continuation is a sibling of this mode, so it sees the same parent
        let starts = match &mode.starts {
            Some(reference) => self.resolve(reference, id, parent_end, false)?.first().copied(),
            None => None,
        };

        let mut rules = Vec::new();
        for id in &contains {
            let child = &self.modes[id.0];
            if let Some(begin) = &child.begin {
                // Keyword begins tolerate a dot on either side (`obj.class`, `.then`)
                let source = if child.begin_keywords {
                    format!(r"\.?(?:{})\.?", begin)
                } else {
                    begin.clone()
                };
                rules.push((Rule::Begin(*id), source));
            }
        }
        if !own_end.is_empty() {
            rules.push((Rule::End, own_end));
        }
        if let Some(illegal) = &mode.illegal {
            rules.push((Rule::Illegal, illegal.clone()));
        }
        let terminators = Terminators::new(rules, self.case_insensitive)?;

        let compiled = &mut self.modes[id.0];
        compiled.contains = contains;
        compiled.starts = starts;
        compiled.terminators = terminators;
        Ok(())
    }

    fn resolve(
        &mut self,
        reference: &ModeRef,
        current: ModeId,
        parent_end: Option<&str>,
        expand: bool,
    ) -> Result<Vec<ModeId>, GrammarError> {
        match reference {
            ModeRef::Named(name) if name == SELF_REFERENCE => Ok(vec![current]),
            ModeRef::Named(name) => {
                let mode = self.lookup(name)?;
                let dependent = self.depends_on_parent(&mode);
                if dependent {
                    if let Some(ids) = self.enclosing(name, expand, parent_end) {
                        return Ok(ids);
                    }
                }
                let scope = if dependent {
                    parent_end.map(str::to_string)
                } else {
                    parent_end.map(|_| String::new())
                };
                let key = (name.clone(), expand, scope);
                if let Some(ids) = self.named.get(&key) {
                    return Ok(ids.clone());
                }

                let modes = instances(&mode, expand);
                let ids = self.prepare_all(&modes, parent_end)?;
                self.named.insert(key, ids.clone());
                if !dependent {
                    self.link_all(&ids, &modes, parent_end)?;
                    return Ok(ids);
                }

                self.linking.push((name.clone(), expand, ids.clone()));
                let linked = self.link_all(&ids, &modes, parent_end);
                self.linking.pop();
                linked?;
                Ok(ids)
            }
            ModeRef::Inline(mode) => {
                let modes = instances(mode, expand);
                let ids = self.prepare_all(&modes, parent_end)?;
                self.link_all(&ids, &modes, parent_end)?;
                Ok(ids)
            }
        }
    }

    /// The copy of `name` being linked further out, when `parent_end` only extends that
    /// copy's own terminator end.
    fn enclosing(
        &self,
        name: &str,
        expand: bool,
        parent_end: Option<&str>,
    ) -> Option<Vec<ModeId>> {
        let parent_end = parent_end?;
        self.linking
            .iter()
            .rev()
            .filter(|(linked, expanded, _)| linked == name && *expanded == expand)
            .find(|(_, _, ids)| {
                ids.iter()
                    .any(|id| extends(parent_end, &self.modes[id.0].terminator_end))
            })
            .map(|(_, _, ids)| ids.clone())
    }

    /// A grammar definition, or else a common mode.
    fn lookup(&self, name: &str) -> Result<Mode, GrammarError> {
        if let Some(mode) = self.grammar.definitions.get(name) {
            return Ok(mode.clone());
        }
        modes::common_mode(name).ok_or_else(|| GrammarError::UnknownMode(name.to_string()))
    }

    fn depends_on_parent(&self, mode: &Mode) -> bool {
        let mut current = Some(mode.clone());
        for _ in 0..MAX_STARTS_CHAIN {
            let Some(mode) = current else {
                return false;
            };
            if mode.ends_with_parent {
                return true;
            }
            current = match mode.starts.as_deref() {
                Some(ModeRef::Inline(next)) => Some((**next).clone()),
                Some(ModeRef::Named(name)) if name != SELF_REFERENCE => self.lookup(name).ok(),
                _ => None,
            };
        }
        false
    }
}

/// The concrete modes a reference stands for: one per variant when expanding, otherwise
/// the mode itself with its variants dropped.
fn instances(mode: &Mode, expand: bool) -> Vec<Mode> {
    if expand {
        mode.expand_variants()
    } else {
        vec![without_variants(mode)]
    }
}

/// Whether `end` is `base`, or `base` with more alternatives in front of it.
fn extends(end: &str, base: &str) -> bool {
    end == base
        || (!base.is_empty()
            && end
                .strip_suffix(base)
                .map_or(false, |front| front.ends_with('|')))
}

/// An empty pattern counts as unset.
fn non_empty(pattern: &Option<String>) -> Option<String> {
    pattern.clone().filter(|pattern| !pattern.is_empty())
}

fn without_variants(mode: &Mode) -> Mode {
    Mode {
        variants: Vec::new(),
        ..mode.clone()
    }
}
