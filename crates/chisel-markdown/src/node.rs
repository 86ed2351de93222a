//! Document node model.
//!
//! A parsed document is a strict parent→children tree of [`Node`] values.
//! Attributes live in a [`BTreeMap`] so that every serializer emits them in
//! lexicographic key order.

use std::collections::BTreeMap;
use std::fmt;

/// Key-sorted string attributes of a node.
pub type Attributes = BTreeMap<String, String>;

/// Kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    /// Heading with a level in `1..=6`.
    Heading(u8),
    Paragraph,
    /// Fenced code block; the language lives in the `language` attribute.
    CodeBlock,
    InlineCode,
    Bold,
    Italic,
    /// Hyperlink; the target lives in the `href` attribute.
    Link,
    /// Image; `src` and `alt` attributes are always present.
    Image,
    List,
    /// List item; `ordered = "true"` marks a numbered list.
    ListItem,
    Quote,
    Table,
    TableRow,
    TableCell,
    Text,
    LineBreak,
    HorizontalRule,
}

impl NodeKind {
    /// Block-level kinds get a blank line after them in canonical markdown.
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::Heading(_)
                | Self::CodeBlock
                | Self::List
                | Self::Quote
                | Self::Table
                | Self::HorizontalRule
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("Document"),
            Self::Heading(level) => write!(f, "Heading({level})"),
            Self::Paragraph => f.write_str("Paragraph"),
            Self::CodeBlock => f.write_str("CodeBlock"),
            Self::InlineCode => f.write_str("InlineCode"),
            Self::Bold => f.write_str("Bold"),
            Self::Italic => f.write_str("Italic"),
            Self::Link => f.write_str("Link"),
            Self::Image => f.write_str("Image"),
            Self::List => f.write_str("List"),
            Self::ListItem => f.write_str("ListItem"),
            Self::Quote => f.write_str("Quote"),
            Self::Table => f.write_str("Table"),
            Self::TableRow => f.write_str("TableRow"),
            Self::TableCell => f.write_str("TableCell"),
            Self::Text => f.write_str("Text"),
            Self::LineBreak => f.write_str("LineBreak"),
            Self::HorizontalRule => f.write_str("HorizontalRule"),
        }
    }
}

/// A node of the document tree.
///
/// An empty `text` means the node carries no literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub text: String,
    pub attributes: Attributes,
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: String::new(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Create a node carrying literal text.
    #[must_use]
    pub fn with_text(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(kind)
        }
    }

    /// Create an empty document root.
    #[must_use]
    pub fn document() -> Self {
        Self::new(NodeKind::Document)
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_text(NodeKind::Text, text)
    }

    /// Create a heading. The level is clamped into `1..=6`.
    #[must_use]
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::with_text(NodeKind::Heading(level.clamp(1, 6)), text)
    }

    /// Create a fenced code block with an optional language.
    #[must_use]
    pub fn code_block(language: Option<&str>, code: impl Into<String>) -> Self {
        let mut node = Self::with_text(NodeKind::CodeBlock, code);
        if let Some(lang) = language.filter(|l| !l.is_empty()) {
            node.set_attribute("language", lang);
        }
        node
    }

    /// Create a link.
    #[must_use]
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        let mut node = Self::with_text(NodeKind::Link, text);
        node.set_attribute("href", href);
        node
    }

    /// Create an image.
    #[must_use]
    pub fn image(alt: impl Into<String>, src: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Image);
        node.set_attribute("alt", alt);
        node.set_attribute("src", src);
        node
    }

    /// Create an empty list item.
    #[must_use]
    pub fn list_item(ordered: bool) -> Self {
        let mut node = Self::new(NodeKind::ListItem);
        if ordered {
            node.set_attribute("ordered", "true");
        }
        node
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Heading level, if this node is a heading.
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading(level) => Some(level),
            _ => None,
        }
    }

    /// Whether a list item belongs to a numbered list.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.attribute("ordered") == Some("true")
    }
}
