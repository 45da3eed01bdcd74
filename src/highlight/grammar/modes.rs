//! Common mode library
//!
//! Modes and regex fragments shared by most grammars. Grammar files reference the modes by
//! name (`contains: [c_line_comment, quote_string]`); Rust code can call the constructors.

use super::Mode;

pub const IDENT_RE: &str = r"[a-zA-Z]\w*";
pub const UNDERSCORE_IDENT_RE: &str = r"[a-zA-Z_]\w*";
pub const NUMBER_RE: &str = r"\b\d+(\.\d+)?";
pub const C_NUMBER_RE: &str = r"(-?)(\b0[xX][a-fA-F0-9]+|(\b\d+(\.\d*)?|\.\d+)([eE][-+]?\d+)?)";
pub const BINARY_NUMBER_RE: &str = r"\b(0b[01]+)";
pub const RE_STARTERS_RE: &str = r"!|!=|!==|%|%=|&|&&|&=|\*|\*=|\+|\+=|,|-|-=|/=|/|:|;|<<|<<=|<=|<|===|==|=|>>>=|>>=|>=|>>>|>>|>|\?|\[|\{|\(|\^|\^=|\||\|=|\|\||~";

const PHRASAL_WORDS_RE: &str = r"\b(a|an|the|are|I'm|isn't|don't|doesn't|won't|but|just|should|pretty|simply|enough|gonna|going|wtf|so|such|will|you|your|they|like|more)\b";

const CSS_UNITS: &str =
    "(%|em|ex|ch|rem|vw|vh|vmin|vmax|cm|mm|in|pt|pc|px|deg|grad|rad|turn|s|ms|Hz|kHz|dpi|dpcm|dppx)?";

/// Names accepted by [`common_mode`].
pub const COMMON_MODE_NAMES: &[&str] = &[
    "backslash_escape",
    "apos_string",
    "quote_string",
    "phrasal_words",
    "doctag",
    "c_line_comment",
    "c_block_comment",
    "hash_comment",
    "number",
    "c_number",
    "binary_number",
    "css_number",
    "regexp",
    "title",
    "underscore_title",
    "method_guard",
];

/// Look up a common mode by reference name.
pub fn common_mode(name: &str) -> Option<Mode> {
    let mode = match name {
        "backslash_escape" => backslash_escape(),
        "apos_string" => apos_string(),
        "quote_string" => quote_string(),
        "phrasal_words" => phrasal_words(),
        "doctag" => doctag(),
        "c_line_comment" => comment("//", "$"),
        "c_block_comment" => comment(r"/\*", r"\*/"),
        "hash_comment" => comment("#", "$"),
        "number" => Mode::new().class_name("number").begin(NUMBER_RE).relevance(0),
        "c_number" => Mode::new().class_name("number").begin(C_NUMBER_RE).relevance(0),
        "binary_number" => Mode::new()
            .class_name("number")
            .begin(BINARY_NUMBER_RE)
            .relevance(0),
        "css_number" => Mode::new()
            .class_name("number")
            .begin(format!("{}{}", NUMBER_RE, CSS_UNITS))
            .relevance(0),
        "regexp" => regexp(),
        "title" => Mode::new().class_name("title").begin(IDENT_RE).relevance(0),
        "underscore_title" => Mode::new()
            .class_name("title")
            .begin(UNDERSCORE_IDENT_RE)
            .relevance(0),
        "method_guard" => Mode::new()
            .begin(format!(r"\.\s*{}", UNDERSCORE_IDENT_RE))
            .relevance(0),
        _ => return None,
    };
    Some(mode)
}

pub fn backslash_escape() -> Mode {
    Mode::new().begin(r"\\[\s\S]").relevance(0)
}

pub fn apos_string() -> Mode {
    Mode::new()
        .class_name("string")
        .begin("'")
        .end("'")
        .illegal(r"\n")
        .contains([backslash_escape()])
}

pub fn quote_string() -> Mode {
    Mode::new()
        .class_name("string")
        .begin("\"")
        .end("\"")
        .illegal(r"\n")
        .contains([backslash_escape()])
}

/// Common English words; a comment full of them is more likely a comment.
pub fn phrasal_words() -> Mode {
    Mode::new().begin(PHRASAL_WORDS_RE)
}

pub fn doctag() -> Mode {
    Mode::new()
        .class_name("doctag")
        .begin("(?:TODO|FIXME|NOTE|BUG|XXX):")
        .relevance(0)
}

/// A comment mode between `begin` and `end`, recognizing prose words and doc tags.
pub fn comment(begin: &str, end: &str) -> Mode {
    Mode::new()
        .class_name("comment")
        .begin(begin)
        .end(end)
        .contains([phrasal_words(), doctag()])
}

pub fn regexp() -> Mode {
    Mode::new()
        .class_name("regexp")
        .begin("/")
        .end("/[gimuy]*")
        .illegal(r"\n")
        .contains([
            backslash_escape(),
            Mode::new()
                .begin(r"\[")
                .end(r"\]")
                .relevance(0)
                .contains([backslash_escape()]),
        ])
}
