//! HTML element model and serializer.
//!
//! A document [`Node`] tree is first converted to a tree of [`HtmlNode`]
//! elements using a fixed kind→tag/class table, then serialized with
//! two-space indentation. Inline tags keep their children on one line.

use crate::node::{Attributes, Node, NodeKind};

/// Tags that never carry text or children.
const SELF_CLOSING_TAGS: &[&str] = &["img", "hr", "br"];

/// Tags whose children are rendered inline without indentation.
const INLINE_TAGS: &[&str] = &["strong", "em", "a", "code", "span"];

/// A rendered HTML element or a bare text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element {
        tag: String,
        attributes: Attributes,
        text: String,
        children: Vec<HtmlNode>,
    },
    Text(String),
}

impl HtmlNode {
    /// Create an element with a single `class` attribute.
    #[must_use]
    pub fn element(tag: impl Into<String>, class: &str) -> Self {
        let mut attributes = Attributes::new();
        if !class.is_empty() {
            attributes.insert("class".to_owned(), class.to_owned());
        }
        Self::Element {
            tag: tag.into(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn set_attribute(&mut self, key: &str, value: &str) {
        if let Self::Element { attributes, .. } = self {
            attributes.insert(key.to_owned(), value.to_owned());
        }
    }

    fn set_text(&mut self, value: &str) {
        if let Self::Element { text, .. } = self {
            value.clone_into(text);
        }
    }

    fn push(&mut self, child: HtmlNode) {
        if let Self::Element { children, .. } = self {
            children.push(child);
        }
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// # Example
///
/// ```
/// use chisel_markdown::escape_html;
///
/// assert_eq!(escape_html("a < b & 'c'"), "a &lt; b &amp; &#39;c&#39;");
/// ```
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert a document node into its HTML element.
#[must_use]
pub fn to_html_node(node: &Node) -> HtmlNode {
    let convert_children = |element: &mut HtmlNode| {
        for child in &node.children {
            element.push(to_html_node(child));
        }
    };
    // Container kinds render their own text after the inline children.
    let trailing_text = |element: &mut HtmlNode| {
        if !node.text.is_empty() {
            element.push(HtmlNode::Text(node.text.clone()));
        }
    };

    match node.kind {
        NodeKind::Document => {
            let mut element = HtmlNode::element("div", "");
            convert_children(&mut element);
            element
        }
        NodeKind::Heading(level) => {
            let mut element = HtmlNode::element(format!("h{level}"), "heading-primary");
            element.set_text(&node.text);
            element
        }
        NodeKind::CodeBlock => {
            let mut code = HtmlNode::element("code", "");
            if let Some(language) = node.attribute("language") {
                code.set_attribute("class", &format!("language-{language}"));
            }
            code.set_text(&node.text);
            let mut pre = HtmlNode::element("pre", "code-block");
            pre.push(code);
            pre
        }
        NodeKind::InlineCode => {
            let mut element = HtmlNode::element("code", "inline-code");
            element.set_text(&node.text);
            element
        }
        NodeKind::Link => {
            let mut element = HtmlNode::element("a", "link");
            element.set_attribute("href", node.attribute("href").unwrap_or_default());
            element.set_text(&node.text);
            element
        }
        NodeKind::Image => {
            let mut element = HtmlNode::element("img", "image");
            element.set_attribute("src", node.attribute("src").unwrap_or_default());
            element.set_attribute("alt", node.attribute("alt").unwrap_or_default());
            element
        }
        NodeKind::List | NodeKind::Table | NodeKind::TableRow => {
            let (tag, class) = match node.kind {
                NodeKind::List => ("ul", "list"),
                NodeKind::Table => ("table", "table"),
                _ => ("tr", "table-row"),
            };
            let mut element = HtmlNode::element(tag, class);
            convert_children(&mut element);
            element
        }
        NodeKind::Paragraph
        | NodeKind::Bold
        | NodeKind::Italic
        | NodeKind::ListItem
        | NodeKind::Quote
        | NodeKind::TableCell => {
            let (tag, class) = match node.kind {
                NodeKind::Paragraph => ("p", "paragraph"),
                NodeKind::Bold => ("strong", "bold"),
                NodeKind::Italic => ("em", "italic"),
                NodeKind::ListItem => ("li", "list-item"),
                NodeKind::Quote => ("blockquote", "quote"),
                _ => ("td", "table-cell"),
            };
            let mut element = HtmlNode::element(tag, class);
            convert_children(&mut element);
            trailing_text(&mut element);
            element
        }
        NodeKind::Text => HtmlNode::Text(node.text.clone()),
        NodeKind::LineBreak => HtmlNode::element("br", "line-break"),
        NodeKind::HorizontalRule => HtmlNode::element("hr", "horizontal-rule"),
    }
}

/// Serialize a document tree to an indented HTML fragment.
///
/// The root [`NodeKind::Document`] becomes a `<div>` wrapper.
#[must_use]
pub fn serialize_html(document: &Node) -> String {
    let mut out = String::new();
    write_html(&mut out, &to_html_node(document), 0);
    out
}

impl HtmlNode {
    /// Serialize this element at the given indentation depth.
    #[must_use]
    pub fn to_html(&self, depth: usize) -> String {
        let mut out = String::new();
        write_html(&mut out, self, depth);
        out
    }
}

fn write_html(out: &mut String, node: &HtmlNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        HtmlNode::Text(text) => {
            if !text.is_empty() {
                out.push_str(&indent);
                out.push_str(&escape_html(text));
            }
        }
        HtmlNode::Element {
            tag,
            attributes,
            text,
            children,
        } => {
            out.push_str(&indent);
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }

            if SELF_CLOSING_TAGS.contains(&tag.as_str()) {
                out.push_str(" />");
                return;
            }
            out.push('>');

            if !text.is_empty() {
                let highlighted = tag == "code"
                    && attributes
                        .get("class")
                        .is_some_and(|class| class.starts_with("language-"));
                if highlighted {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_html(text));
                }
            }

            let inline = INLINE_TAGS.contains(&tag.as_str());
            for child in children {
                if inline {
                    write_html(out, child, 0);
                } else {
                    out.push('\n');
                    write_html(out, child, depth + 1);
                }
            }
            if !children.is_empty() && !inline {
                out.push('\n');
                out.push_str(&indent);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::parse_markdown;

    #[test]
    fn test_escape_all_special_characters() {
        assert_eq!(
            escape_html(r#"This & that <tag> "q" 'q'"#),
            "This &amp; that &lt;tag&gt; &quot;q&quot; &#39;q&#39;"
        );
    }

    #[test]
    fn test_text_escaped_in_paragraph() {
        let doc = Node::document().with_child(
            Node::new(NodeKind::Paragraph).with_child(Node::text(r#"This & that <tag> "q" 'q'"#)),
        );
        assert_eq!(
            serialize_html(&doc),
            "<div>\n  <p class=\"paragraph\">\n    This &amp; that &lt;tag&gt; &quot;q&quot; &#39;q&#39;\n  </p>\n</div>"
        );
    }

    #[test]
    fn test_highlighted_code_is_not_escaped() {
        let doc = Node::document().with_child(Node::code_block(Some("js"), "<b>"));
        assert_eq!(
            serialize_html(&doc),
            "<div>\n  <pre class=\"code-block\">\n    <code class=\"language-js\"><b></code>\n  </pre>\n</div>"
        );
    }

    #[test]
    fn test_plain_code_block_is_escaped() {
        let doc = Node::document().with_child(Node::code_block(None, "<b>"));
        assert!(serialize_html(&doc).contains("<code>&lt;b&gt;</code>"));
    }

    #[test]
    fn test_image_attributes_in_key_order() {
        let html = to_html_node(&Node::image("Logo", "/logo.png")).to_html(0);
        assert_eq!(html, r#"<img alt="Logo" class="image" src="/logo.png" />"#);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let html = to_html_node(&Node::link("x", "/a?b=1&c=\"2\"")).to_html(0);
        assert_eq!(
            html,
            r#"<a class="link" href="/a?b=1&amp;c=&quot;2&quot;">x</a>"#
        );
    }

    #[test]
    fn test_list_item_indentation() {
        let html = serialize_html(&parse_markdown("- First item"));
        assert_eq!(
            html,
            "<div>\n  <ul class=\"list\">\n    <li class=\"list-item\">\n      First item\n    </li>\n  </ul>\n</div>"
        );
    }

    #[test]
    fn test_inline_tags_render_children_on_one_line() {
        let html = serialize_html(&parse_markdown("Some **bold** text"));
        assert_eq!(
            html,
            "<div>\n  <p class=\"paragraph\">\n    Some \n    <strong class=\"bold\">bold</strong>\n     text\n  </p>\n</div>"
        );
    }

    #[test]
    fn test_bold_with_children_stays_inline() {
        let bold = Node::new(NodeKind::Bold)
            .with_child(Node::text("a "))
            .with_child(Node::with_text(NodeKind::Italic, "b"));
        assert_eq!(
            to_html_node(&bold).to_html(3),
            r#"      <strong class="bold">a <em class="italic">b</em></strong>"#
        );
    }

    #[test]
    fn test_self_closing_tags() {
        assert_eq!(
            to_html_node(&Node::new(NodeKind::HorizontalRule)).to_html(0),
            r#"<hr class="horizontal-rule" />"#
        );
        assert_eq!(
            to_html_node(&Node::new(NodeKind::LineBreak)).to_html(1),
            r#"  <br class="line-break" />"#
        );
    }

    #[test]
    fn test_full_document_substrings() {
        let source = "# Title\n\nSome **bold**, *italic* and `code` with [a link](https://example.com).\n\n- one\n- two\n\n> quoted\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\n---";
        let html = serialize_html(&parse_markdown(source));

        for expected in [
            r#"<h1 class="heading-primary">Title</h1>"#,
            r#"<strong class="bold">bold</strong>"#,
            r#"<em class="italic">italic</em>"#,
            r#"<code class="inline-code">code</code>"#,
            r#"<a class="link" href="https://example.com">a link</a>"#,
            r#"<ul class="list">"#,
            r#"<blockquote class="quote">"#,
            r#"<table class="table">"#,
            r#"<tr class="table-row">"#,
            r#"<td class="table-cell">"#,
            r#"<hr class="horizontal-rule" />"#,
        ] {
            assert!(html.contains(expected), "missing {expected} in:\n{html}");
        }
    }
}
