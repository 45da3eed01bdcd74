//! Node Emitter
//!
//! Builds the output tree while the tokenizer scans. Open elements live on a stack and are
//! attached to their parent when they close, so the tree is only ever appended to.
//!
//! The tree serializes in the hast shape (`type`/`tagName`/`properties`/`children`), which
//! is what downstream renderers consume.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// A classified span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub class_names: Vec<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn element<I, S>(class_names: I, children: Vec<Node>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Node::Element(Element {
            class_names: class_names.into_iter().map(Into::into).collect(),
            children,
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(value) => Some(value),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Append every text value under this node, in document order.
    pub fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(value) => out.push_str(value),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Concatenated text of a node list.
pub fn text_of(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

/// Top of a serialized tree: `{"type": "root", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub children: Vec<Node>,
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "root")?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Text(value) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "text")?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Node::Element(element) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "element")?;
                map.serialize_entry("tagName", "span")?;
                map.serialize_entry("properties", &Properties(&element.class_names))?;
                map.serialize_entry("children", &element.children)?;
                map.end()
            }
        }
    }
}

struct Properties<'a>(&'a [String]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("className", self.0)?;
        map.end()
    }
}

/// Append `text`, merging with a trailing text node. Empty text is a no-op.
pub fn append_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    match nodes.last_mut() {
        Some(Node::Text(tail)) => tail.push_str(text),
        _ => nodes.push(Node::Text(text.to_string())),
    }
}

/// Class names for a dotted classification.
///
/// `"meta.string"` with prefix `"hljs-"` gives `["hljs-meta", "string_"]`: the first
/// segment is prefixed, each later segment gets one underscore per level of depth.
pub fn class_names(prefix: &str, name: &str) -> Vec<String> {
    name.split('.')
        .enumerate()
        .map(|(depth, segment)| {
            if depth == 0 {
                format!("{}{}", prefix, segment)
            } else {
                format!("{}{}", segment, "_".repeat(depth))
            }
        })
        .collect()
}

/// Tree builder driven by the tokenizer.
#[derive(Debug)]
pub struct Emitter<'p> {
    prefix: &'p str,
    root: Vec<Node>,
    open: Vec<Element>,
}

impl<'p> Emitter<'p> {
    pub fn new(prefix: &'p str) -> Self {
        Emitter {
            prefix,
            root: Vec::new(),
            open: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(element) => &mut element.children,
            None => &mut self.root,
        }
    }

    pub fn add_text(&mut self, text: &str) {
        append_text(self.current(), text);
    }

    /// Open an element for a mode's class name; later output goes inside it.
    pub fn open(&mut self, class_name: &str) {
        self.open.push(Element {
            class_names: class_names(self.prefix, class_name),
            children: Vec::new(),
        });
    }

    /// Close the innermost open element. Returns `false` when nothing was open.
    pub fn close(&mut self) -> bool {
        match self.open.pop() {
            Some(element) => {
                self.current().push(Node::Element(element));
                true
            }
            None => false,
        }
    }

    pub fn add_keyword(&mut self, class_name: &str, lexeme: &str) {
        let mut children = Vec::new();
        append_text(&mut children, lexeme);
        let class_names = class_names(self.prefix, class_name);
        self.current().push(Node::Element(Element {
            class_names,
            children,
        }));
    }

    /// Wrap a sublanguage's nodes in one element named after the language, unprefixed.
    pub fn add_sub_language(&mut self, language: &str, nodes: Vec<Node>) {
        self.current().push(Node::Element(Element {
            class_names: vec![language.to_string()],
            children: nodes,
        }));
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Close whatever is still open and return the top-level nodes.
    pub fn finish(mut self) -> Vec<Node> {
        while self.close() {}
        self.root
    }
}
