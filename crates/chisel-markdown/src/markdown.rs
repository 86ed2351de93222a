//! Canonical markdown re-emission.
//!
//! Output is best-effort and not guaranteed to byte-match the source the
//! tree was parsed from.

use crate::node::{Node, NodeKind};

/// Serialize a node tree back to markdown.
#[must_use]
pub fn serialize_markdown(node: &Node) -> String {
    let mut out = String::new();
    write_markdown(&mut out, node, 0);
    out
}

fn write_children(out: &mut String, node: &Node, depth: usize) {
    for child in &node.children {
        write_markdown(out, child, depth);
    }
}

/// Children first, then the node's own text.
fn write_content(out: &mut String, node: &Node, depth: usize) {
    write_children(out, node, depth);
    out.push_str(&node.text);
}

fn write_markdown(out: &mut String, node: &Node, depth: usize) {
    match node.kind {
        NodeKind::Document => {
            for child in &node.children {
                write_markdown(out, child, depth);
                if child.kind.is_block() {
                    out.push('\n');
                }
            }
        }
        NodeKind::Heading(level) => {
            out.push_str(&"#".repeat(usize::from(level)));
            out.push(' ');
            out.push_str(&node.text);
            out.push('\n');
        }
        NodeKind::Paragraph => {
            write_content(out, node, depth);
            out.push('\n');
        }
        NodeKind::CodeBlock => {
            out.push_str("```");
            out.push_str(node.attribute("language").unwrap_or_default());
            out.push('\n');
            out.push_str(&node.text);
            out.push_str("\n```\n");
        }
        NodeKind::InlineCode => {
            out.push('`');
            out.push_str(&node.text);
            out.push('`');
        }
        NodeKind::Bold | NodeKind::Italic => {
            let marker = if node.kind == NodeKind::Bold { "**" } else { "*" };
            out.push_str(marker);
            write_content(out, node, depth);
            out.push_str(marker);
        }
        NodeKind::Link => {
            out.push('[');
            out.push_str(&node.text);
            out.push_str("](");
            out.push_str(node.attribute("href").unwrap_or_default());
            out.push(')');
        }
        NodeKind::Image => {
            out.push_str("![");
            out.push_str(node.attribute("alt").unwrap_or_default());
            out.push_str("](");
            out.push_str(node.attribute("src").unwrap_or_default());
            out.push(')');
        }
        NodeKind::List => write_children(out, node, depth),
        NodeKind::ListItem => {
            out.push_str(&"  ".repeat(depth));
            out.push_str(if node.is_ordered() { "1. " } else { "- " });
            write_content(out, node, depth + 1);
            out.push('\n');
        }
        NodeKind::Quote => {
            out.push_str("> ");
            write_content(out, node, depth);
            out.push('\n');
        }
        NodeKind::Table => {
            for (i, row) in node.children.iter().enumerate() {
                write_markdown(out, row, depth);
                if i == 0 {
                    out.push('|');
                    for _ in &row.children {
                        out.push_str(" --- |");
                    }
                    out.push('\n');
                }
            }
        }
        NodeKind::TableRow => {
            out.push('|');
            for cell in &node.children {
                out.push(' ');
                write_markdown(out, cell, depth);
                out.push_str(" |");
            }
            out.push('\n');
        }
        NodeKind::TableCell => {
            out.push_str(&node.text);
            write_children(out, node, depth);
        }
        NodeKind::Text => out.push_str(&node.text),
        NodeKind::LineBreak => out.push_str("  \n"),
        NodeKind::HorizontalRule => out.push_str("---\n"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::parse_markdown;

    #[test]
    fn test_blocks_are_separated_by_blank_lines() {
        let doc = parse_markdown("# Title\nSome **bold** and *it*\n\n```rust\nlet x = 1;\n```\n---");
        assert_eq!(
            serialize_markdown(&doc),
            "# Title\n\nSome **bold** and *it*\n\n```rust\nlet x = 1;\n```\n\n---\n\n"
        );
    }

    #[test]
    fn test_lists_use_canonical_markers() {
        let doc = parse_markdown("* a\n+ b\n\n3. c\n7. d");
        assert_eq!(serialize_markdown(&doc), "- a\n- b\n\n1. c\n1. d\n\n");
    }

    #[test]
    fn test_table_gets_synthesized_separator() {
        let doc = parse_markdown("| A | B |\n|:-:|---|\n| `1` | [x](/x) |");
        // `:-:` is not a separator row, so it survives as a data row.
        assert_eq!(
            serialize_markdown(&doc),
            "| A | B |\n| --- | --- |\n| :-: | --- |\n| `1` | [x](/x) |\n\n"
        );
    }

    #[test]
    fn test_inline_nodes() {
        let paragraph = Node::new(NodeKind::Paragraph)
            .with_child(Node::image("alt", "/a.png"))
            .with_child(Node::new(NodeKind::LineBreak))
            .with_child(Node::text("next"));
        assert_eq!(serialize_markdown(&paragraph), "![alt](/a.png)  \nnext\n");
    }

    #[test]
    fn test_quote_and_nested_list_item() {
        let doc = Node::document()
            .with_child(Node::new(NodeKind::Quote).with_child(Node::text("wise words")));
        assert_eq!(serialize_markdown(&doc), "> wise words\n\n");

        let item = Node::list_item(false).with_child(Node::text("x"));
        let mut out = String::new();
        write_markdown(&mut out, &item, 2);
        assert_eq!(out, "    - x\n");
    }
}
