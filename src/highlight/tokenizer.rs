//! Tokenizer
//!
//!     Walks text through a [`CompiledLanguage`], driven by the terminator matcher of the
//!     innermost open mode. Each match is a begin (a child mode opens), an end (the mode,
//!     or ancestors it ends with, close) or an illegal lexeme. Text between matches
//!     collects in a buffer that is flushed into the [`Emitter`] whenever the mode stack
//!     changes, through the mode's dispatch: plain text, keyword lookup, or a recursive
//!     highlight in a sublanguage.
//!
//!     State
//!
//!     - frames: the activation stack. `frames[0]` is the language root and is never
//!       popped. A frame may carry its own end pattern (`endSameAsBegin` binds the end to
//!       the exact begin lexeme).
//!     - buffer: text since the last flush.
//!     - relevance: keyword scores plus the weight of every closed mode.
//!     - continuations: per explicit sublanguage, where its last chunk stopped, so the
//!       next chunk resumes inside the same modes.
//!
//!     Progress
//!
//!     Every step advances the cursor or changes the stack. A begin immediately followed by
//!     an empty end at the same offset, and any empty lexeme that changes nothing, push one
//!     character into the buffer instead.

use super::compiler::composer::{Rule, TerminatorMatch};
use super::compiler::keywords::KeywordTable;
use super::compiler::pattern::Pattern;
use super::compiler::{CompiledLanguage, CompiledMode, Dispatch};
use super::detect;
use super::emitter::{Emitter, Node};
use super::error::HighlightError;
use super::grammar::SubLanguage;
use super::highlighter::{self, Illegals};
use super::registry::Registry;
use super::ModeId;
use std::collections::HashMap;

/// Sublanguages nested deeper than this are emitted as plain text.
pub const MAX_SUB_LANGUAGE_DEPTH: usize = 8;

/// What every scan in one highlight call shares.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub registry: &'a Registry,
    pub prefix: &'a str,
    pub depth: usize,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Registry, prefix: &'a str) -> Self {
        Context {
            registry,
            prefix,
            depth: 0,
        }
    }

    fn nested(self) -> Self {
        Context {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// One activation on the mode stack.
#[derive(Debug, Clone)]
struct Frame {
    mode: ModeId,
    /// End pattern bound at begin time, replacing the mode's own
    end: Option<Pattern>,
    /// Whether an element was opened for this frame in the current scan
    opened: bool,
    /// Carried over from an earlier chunk; its weight was already counted there
    resumed: bool,
}

/// Where a scan stopped, for resuming an embedded language in a later chunk.
#[derive(Debug, Clone)]
pub struct Continuation {
    frames: Vec<Frame>,
}

impl Continuation {
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Output of a finished scan.
#[derive(Debug, Clone)]
pub struct Scanned {
    pub nodes: Vec<Node>,
    pub relevance: u32,
    pub continuation: Continuation,
}

/// Scan `text` with `language`, optionally resuming where an earlier chunk stopped.
///
/// Fails only with [`HighlightError::Illegal`] (when `illegals` is not
/// [`Illegals::Ignore`]) or with errors from sublanguages.
pub fn scan(
    context: Context<'_>,
    language: &CompiledLanguage,
    text: &str,
    illegals: Illegals,
    resume: Option<Continuation>,
) -> Result<Scanned, HighlightError> {
    let frames = match resume {
        Some(continuation) if !continuation.frames.is_empty() => continuation
            .frames
            .into_iter()
            .map(|frame| Frame {
                opened: false,
                resumed: true,
                ..frame
            })
            .collect(),
        _ => vec![Frame {
            mode: ModeId::ROOT,
            end: None,
            opened: false,
            resumed: false,
        }],
    };

    if text.is_empty() {
        return Ok(Scanned {
            nodes: Vec::new(),
            relevance: 0,
            continuation: Continuation { frames },
        });
    }

    Scanner {
        context,
        language,
        text,
        illegals,
        frames,
        buffer: String::new(),
        emitter: Emitter::new(context.prefix),
        relevance: 0,
        continuations: HashMap::new(),
        last: None,
    }
    .run()
}

struct Scanner<'a> {
    context: Context<'a>,
    language: &'a CompiledLanguage,
    text: &'a str,
    illegals: Illegals,
    frames: Vec<Frame>,
    buffer: String,
    emitter: Emitter<'a>,
    relevance: u32,
    continuations: HashMap<String, Continuation>,
    last: Option<TerminatorMatch>,
}

impl<'a> Scanner<'a> {
    fn run(mut self) -> Result<Scanned, HighlightError> {
        let text = self.text;
        let mut offset = 0;

        while let Some(found) = self.top().terminators.find(text, offset) {
            let skipped = &text[offset..found.start];
            match self.process(skipped, found)? {
                Some(count) => offset = found.start + count,
                None => {
                    offset = text.len();
                    break;
                }
            }
        }

        self.buffer.push_str(&text[offset..]);
        self.flush()?;

        let continuation = Continuation {
            frames: self.frames.clone(),
        };
        while self.frames.len() > 1 {
            self.pop();
        }

        Ok(Scanned {
            nodes: self.emitter.finish(),
            relevance: self.relevance,
            continuation,
        })
    }

    fn top(&self) -> &'a CompiledMode {
        let language = self.language;
        let id = self.frames.last().map(|frame| frame.mode).unwrap_or(ModeId::ROOT);
        language.mode(id)
    }

    /// Handle one terminator match. Returns how far past `found.start` to continue, or
    /// `None` when the text is exhausted.
    fn process(
        &mut self,
        skipped: &str,
        found: TerminatorMatch,
    ) -> Result<Option<usize>, HighlightError> {
        self.buffer.push_str(skipped);
        let lexeme = found.lexeme(self.text);

        if let Some(last) = self.last {
            if matches!(last.rule, Rule::Begin(_))
                && found.rule == Rule::End
                && last.start == found.start
                && lexeme.is_empty()
            {
                return Ok(self.force_char(found.start));
            }
        }
        self.last = Some(found);

        match found.rule {
            Rule::Begin(id) => return self.begin(id, lexeme, found.start).map(Some),
            Rule::End => {
                if let Some(count) = self.end(lexeme, found.start)? {
                    return Ok(Some(count));
                }
            }
            Rule::Illegal => {
                if self.illegals != Illegals::Ignore {
                    return Err(HighlightError::Illegal {
                        lexeme: lexeme.to_string(),
                        mode: self.top().display_name().to_string(),
                    });
                }
            }
        }

        // An ignored illegal, or an end candidate that did not close anything
        if lexeme.is_empty() {
            return Ok(self.force_char(found.start));
        }
        self.buffer.push_str(lexeme);
        Ok(Some(lexeme.len()))
    }

    /// Push the character at `at` into the buffer and step over it.
    fn force_char(&mut self, at: usize) -> Option<usize> {
        let c = self.text[at..].chars().next()?;
        self.buffer.push(c);
        Some(c.len_utf8())
    }

    fn begin(&mut self, id: ModeId, lexeme: &str, at: usize) -> Result<usize, HighlightError> {
        let language = self.language;
        let mode = language.mode(id);
        let end = if mode.end_same_as_begin {
            Some(Pattern::literal(lexeme, language.case_insensitive)?)
        } else {
            None
        };

        if mode.skip {
            self.buffer.push_str(lexeme);
        } else {
            if mode.exclude_begin {
                self.buffer.push_str(lexeme);
            }
            self.flush()?;
            if !mode.return_begin && !mode.exclude_begin {
                self.buffer.push_str(lexeme);
            }
        }

        tracing::trace!("Begin {} at {}: {:?}", mode.display_name(), at, lexeme);
        self.enter(id, end);
        Ok(if mode.return_begin { 0 } else { lexeme.len() })
    }

    fn end(&mut self, lexeme: &str, at: usize) -> Result<Option<usize>, HighlightError> {
        let Some(target) = self.ending_frame(self.frames.len() - 1, at) else {
            return Ok(None);
        };

        let origin = self.top();
        if origin.skip {
            self.buffer.push_str(lexeme);
        } else {
            if !(origin.return_end || origin.exclude_end) {
                self.buffer.push_str(lexeme);
            }
            self.flush()?;
            if origin.exclude_end {
                self.buffer.push_str(lexeme);
            }
        }

        let mut ended = None;
        while self.frames.len() > target {
            ended = self.pop();
        }

        if let Some(frame) = ended {
            let language = self.language;
            let mode = language.mode(frame.mode);
            tracing::trace!("End {} at {}: {:?}", mode.display_name(), at, lexeme);
            if let Some(starts) = mode.starts {
                let end = if mode.end_same_as_begin {
                    frame.end.or_else(|| mode.end.clone())
                } else {
                    None
                };
                self.enter(starts, end);
            }
        }

        Ok(Some(if origin.return_end { 0 } else { lexeme.len() }))
    }

    /// Index of the outermost frame closed by an end candidate at `at`, testing frame
    /// `index` and, through `endsWithParent`, its ancestors.
    fn ending_frame(&self, index: usize, at: usize) -> Option<usize> {
        if index == 0 {
            return None;
        }
        let frame = &self.frames[index];
        let mode = self.language.mode(frame.mode);
        let end = frame.end.as_ref().or(mode.end.as_ref());

        if end.map_or(false, |end| end.matches_at(self.text, at)) {
            let mut index = index;
            while index > 1 && self.language.mode(self.frames[index].mode).ends_parent {
                index -= 1;
            }
            return Some(index);
        }
        if mode.ends_with_parent {
            return self.ending_frame(index - 1, at);
        }
        None
    }

    fn enter(&mut self, id: ModeId, end: Option<Pattern>) {
        let mode = self.language.mode(id);
        let opened = match &mode.class_name {
            Some(class_name) => {
                self.emitter.open(class_name);
                true
            }
            None => false,
        };
        self.frames.push(Frame {
            mode: id,
            end,
            opened,
            resumed: false,
        });
    }

    /// Close the innermost frame, counting its weight.
    fn pop(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        let mode = self.language.mode(frame.mode);
        if frame.opened {
            self.emitter.close();
        }
        if !frame.resumed && !mode.skip && !mode.is_sub_language() {
            self.relevance = self.relevance.saturating_add(mode.relevance);
        }
        Some(frame)
    }

    fn flush(&mut self) -> Result<(), HighlightError> {
        let buffer = std::mem::take(&mut self.buffer);
        let mode = self.top();
        match &mode.dispatch {
            Dispatch::Plain => self.emitter.add_text(&buffer),
            Dispatch::Keywords { table, lexemes } => self.keywords(&buffer, table, lexemes),
            Dispatch::SubLanguage(sub_language) => {
                self.sub_language(&buffer, sub_language, mode.relevance)?
            }
        }
        Ok(())
    }

    fn keywords(&mut self, buffer: &str, table: &KeywordTable, lexemes: &Pattern) {
        let mut last = 0;
        let mut from = 0;
        while let Some((start, end)) = lexemes.find_from(buffer, from) {
            self.emitter.add_text(&buffer[last..start]);
            let word = &buffer[start..end];
            match table.get(word) {
                Some(keyword) => {
                    self.relevance = self.relevance.saturating_add(keyword.relevance);
                    self.emitter.add_keyword(&keyword.class_name, word);
                }
                None => self.emitter.add_text(word),
            }
            last = end;
            from = if end > start {
                end
            } else {
                match buffer[end..].chars().next() {
                    Some(c) => end + c.len_utf8(),
                    None => break,
                }
            };
        }
        self.emitter.add_text(&buffer[last..]);
    }

    fn sub_language(
        &mut self,
        buffer: &str,
        sub_language: &SubLanguage,
        weight: u32,
    ) -> Result<(), HighlightError> {
        if buffer.is_empty() {
            return Ok(());
        }
        if self.context.depth >= MAX_SUB_LANGUAGE_DEPTH {
            tracing::warn!("Sublanguage nesting deeper than {}", MAX_SUB_LANGUAGE_DEPTH);
            self.emitter.add_text(buffer);
            return Ok(());
        }
        let context = self.context.nested();

        let (language, relevance, nodes) = match sub_language {
            SubLanguage::Name(name) => {
                if !context.registry.is_registered(name) {
                    tracing::warn!("Sublanguage {} is not registered", name);
                    self.emitter.add_text(buffer);
                    return Ok(());
                }
                let resume = self.continuations.remove(name);
                let (result, continuation) =
                    highlighter::highlight_in(context, name, buffer, Illegals::Ignore, resume)?;
                if let Some(continuation) = continuation {
                    self.continuations.insert(name.clone(), continuation);
                }
                (name.clone(), result.relevance, result.nodes)
            }
            SubLanguage::Candidates(candidates) => {
                let subset = if candidates.is_empty() {
                    None
                } else {
                    Some(candidates.as_slice())
                };
                let result = detect::detect(context, buffer, subset)?;
                match result.language {
                    Some(language) => (language, result.relevance, result.nodes),
                    None => {
                        self.emitter.add_text(buffer);
                        return Ok(());
                    }
                }
            }
        };

        if weight > 0 {
            self.relevance = self.relevance.saturating_add(relevance);
        }
        self.emitter.add_sub_language(&language, nodes);
        Ok(())
    }
}
