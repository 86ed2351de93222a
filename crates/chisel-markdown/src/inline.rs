//! Inline span parsing.
//!
//! Resolves bold, italic, inline code, links and images inside a block's raw
//! text. Patterns are tried in a fixed priority order and the parser commits
//! to the first *pattern* that matches anywhere in the remaining text, not to
//! the match that starts earliest. For example in `` `a` **b** `` the bold
//! span is taken first and the code span ends up inside the leading text.

use std::ops::Range;

use crate::node::{Node, NodeKind};

/// A matched inline span, relative to the text it was found in.
struct Span {
    start: usize,
    end: usize,
    node: Node,
}

type Matcher = fn(&str) -> Option<Span>;

/// Inline patterns in priority order.
const PATTERNS: [Matcher; 5] = [
    match_bold,
    match_italic,
    match_inline_code,
    match_link,
    match_image,
];

/// Parse inline markup in `text` and append the resulting nodes to `parent`.
///
/// Text before each match becomes a [`NodeKind::Text`] node; when no pattern
/// matches the remainder, the remainder becomes one trailing text node.
pub fn parse_inline(text: &str, parent: &mut Node) {
    if text.is_empty() {
        return;
    }

    let produced_from = parent.children.len();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(span) = PATTERNS.iter().find_map(|matcher| matcher(rest)) else {
            parent.children.push(Node::text(rest));
            break;
        };

        if span.start > 0 {
            parent.children.push(Node::text(&rest[..span.start]));
        }
        parent.children.push(span.node);
        pos += span.end;
    }

    if parent.children.len() == produced_from {
        parent.children.push(Node::text(text));
    }
}

/// `**content**`, shortest content wins.
fn match_bold(s: &str) -> Option<Span> {
    let open = s.find("**")?;
    let close = open + 2 + s[open + 2..].find("**")?;
    Some(Span {
        start: open,
        end: close + 2,
        node: Node::with_text(NodeKind::Bold, &s[open + 2..close]),
    })
}

/// `*content*`, content may be empty.
fn match_italic(s: &str) -> Option<Span> {
    let open = s.find('*')?;
    let close = open + 1 + s[open + 1..].find('*')?;
    Some(Span {
        start: open,
        end: close + 1,
        node: Node::with_text(NodeKind::Italic, &s[open + 1..close]),
    })
}

/// `` `content` `` with non-empty content.
fn match_inline_code(s: &str) -> Option<Span> {
    let mut from = 0;
    while let Some(rel) = s[from..].find('`') {
        let open = from + rel;
        let close = open + 1 + s[open + 1..].find('`')?;
        if close > open + 1 {
            return Some(Span {
                start: open,
                end: close + 1,
                node: Node::with_text(NodeKind::InlineCode, &s[open + 1..close]),
            });
        }
        from = open + 1;
    }
    None
}

/// `[text](href)` with non-empty text and href.
fn match_link(s: &str) -> Option<Span> {
    let mut from = 0;
    while let Some(rel) = s[from..].find('[') {
        let open = from + rel;
        if let Some((text, href, end)) = bracket_then_paren(s, open + 1, false) {
            return Some(Span {
                start: open,
                end,
                node: Node::link(&s[text], &s[href]),
            });
        }
        from = open + 1;
    }
    None
}

/// `![alt](src)` with a possibly empty alt and non-empty src.
fn match_image(s: &str) -> Option<Span> {
    let mut from = 0;
    while let Some(rel) = s[from..].find("![") {
        let open = from + rel;
        if let Some((alt, src, end)) = bracket_then_paren(s, open + 2, true) {
            return Some(Span {
                start: open,
                end,
                node: Node::image(&s[alt], &s[src]),
            });
        }
        from = open + 1;
    }
    None
}

/// Match `label](target)` starting right after an opening bracket.
///
/// Returns the label range, the target range and the offset just past `)`.
fn bracket_then_paren(
    s: &str,
    label_start: usize,
    allow_empty_label: bool,
) -> Option<(Range<usize>, Range<usize>, usize)> {
    let label_end = label_start + s[label_start..].find(']')?;
    if label_end == label_start && !allow_empty_label {
        return None;
    }
    if s.as_bytes().get(label_end + 1) != Some(&b'(') {
        return None;
    }
    let target_start = label_end + 2;
    let target_end = target_start + s[target_start..].find(')')?;
    if target_end == target_start {
        return None;
    }
    Some((label_start..label_end, target_start..target_end, target_end + 1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(text: &str) -> Vec<Node> {
        let mut parent = Node::new(NodeKind::Paragraph);
        parse_inline(text, &mut parent);
        parent.children
    }

    #[test]
    fn test_plain_text_is_single_text_node() {
        assert_eq!(parse("Hello World"), vec![Node::text("Hello World")]);
    }

    #[test]
    fn test_empty_text_produces_nothing() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_bold_italic_and_code() {
        assert_eq!(
            parse("This is **bold** and *italic* and `code`"),
            vec![
                Node::text("This is "),
                Node::with_text(NodeKind::Bold, "bold"),
                Node::text(" and "),
                Node::with_text(NodeKind::Italic, "italic"),
                Node::text(" and "),
                Node::with_text(NodeKind::InlineCode, "code"),
            ]
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            parse("Visit [GitHub](https://github.com) today"),
            vec![
                Node::text("Visit "),
                Node::link("GitHub", "https://github.com"),
                Node::text(" today"),
            ]
        );
    }

    #[test]
    fn test_image_with_empty_alt() {
        assert_eq!(parse("![](pic.png)"), vec![Node::image("", "pic.png")]);
    }

    #[test]
    fn test_image_with_alt_is_taken_as_link() {
        // Link outranks image, so the `!` stays behind as text.
        assert_eq!(
            parse("![Logo](logo.png)"),
            vec![Node::text("!"), Node::link("Logo", "logo.png")]
        );
    }

    #[test]
    fn test_priority_beats_position() {
        assert_eq!(
            parse("`code` then **bold**"),
            vec![
                Node::text("`code` then "),
                Node::with_text(NodeKind::Bold, "bold"),
            ]
        );
    }

    #[test]
    fn test_bold_is_non_greedy() {
        assert_eq!(
            parse("**a** and **b**"),
            vec![
                Node::with_text(NodeKind::Bold, "a"),
                Node::text(" and "),
                Node::with_text(NodeKind::Bold, "b"),
            ]
        );
    }

    #[test]
    fn test_unclosed_markers_stay_text() {
        assert_eq!(parse("a * b"), vec![Node::text("a * b")]);
        assert_eq!(parse("[not a link]"), vec![Node::text("[not a link]")]);
        assert_eq!(parse("[text]()"), vec![Node::text("[text]()")]);
    }

    #[test]
    fn test_lone_double_star_is_empty_italic() {
        assert_eq!(
            parse("a ** b"),
            vec![
                Node::text("a "),
                Node::with_text(NodeKind::Italic, ""),
                Node::text(" b"),
            ]
        );
    }

    #[test]
    fn test_empty_backticks_are_skipped() {
        assert_eq!(
            parse("``x`"),
            vec![
                Node::text("`"),
                Node::with_text(NodeKind::InlineCode, "x"),
            ]
        );
    }

    #[test]
    fn test_nested_brackets_in_link_label() {
        assert_eq!(parse("[[a](b)"), vec![Node::link("[a", "b")]);
    }

    #[test]
    fn test_multibyte_text_around_spans() {
        assert_eq!(
            parse("héllo **wörld** ✓"),
            vec![
                Node::text("héllo "),
                Node::with_text(NodeKind::Bold, "wörld"),
                Node::text(" ✓"),
            ]
        );
    }
}
