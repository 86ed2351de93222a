//! Line-oriented block parsing.
//!
//! Each call to [`parse_block`] consumes one or more lines starting at the
//! cursor and appends at most one block node to the document. Block kinds are
//! tried in a fixed priority order; a line that matches nothing becomes (the
//! start of) a paragraph, so parsing never fails.

use crate::inline::parse_inline;
use crate::node::{Node, NodeKind};

const FENCE: &str = "```";

/// Parse markdown text into a [`NodeKind::Document`] tree.
///
/// # Example
///
/// ```
/// use chisel_markdown::{NodeKind, parse_markdown};
///
/// let doc = parse_markdown("## Setup\n\n- install\n- run");
/// assert_eq!(doc.children[0].kind, NodeKind::Heading(2));
/// assert_eq!(doc.children[1].children.len(), 2);
/// ```
#[must_use]
pub fn parse_markdown(text: &str) -> Node {
    let lines: Vec<&str> = text.lines().collect();
    let mut document = Node::document();
    let mut pos = 0;
    while pos < lines.len() {
        parse_block(&lines, &mut pos, &mut document);
    }
    document
}

fn parse_block(lines: &[&str], pos: &mut usize, parent: &mut Node) {
    let line = lines[*pos];

    if is_blank(line) {
        *pos += 1;
        return;
    }

    if is_horizontal_rule(line) {
        parent.children.push(Node::new(NodeKind::HorizontalRule));
        *pos += 1;
        return;
    }

    if let Some((level, text)) = match_heading(line) {
        parent.children.push(Node::heading(level, text));
        *pos += 1;
        return;
    }

    if let Some(language) = match_fence_open(line) {
        *pos += 1;
        let start = *pos;
        while *pos < lines.len() && !is_fence_close(lines[*pos]) {
            *pos += 1;
        }
        let code = lines[start..*pos].join("\n");
        if *pos < lines.len() {
            *pos += 1;
        }
        parent.children.push(Node::code_block(Some(language), code));
        return;
    }

    if let Some(quoted) = match_quote(line) {
        let mut quote = Node::new(NodeKind::Quote);
        parse_inline(quoted, &mut quote);
        parent.children.push(quote);
        *pos += 1;
        return;
    }

    if let Some(first) = match_list_item(line) {
        let ordered = first.ordered;
        let mut list = Node::new(NodeKind::List);
        while let Some(item) = lines.get(*pos).and_then(|l| match_list_item(l)) {
            let mut node = Node::list_item(ordered);
            parse_inline(item.text, &mut node);
            list.children.push(node);
            *pos += 1;
        }
        parent.children.push(list);
        return;
    }

    if line.contains('|') {
        let mut table = Node::new(NodeKind::Table);
        while let Some(row) = lines.get(*pos).filter(|l| l.contains('|')) {
            *pos += 1;
            if is_separator_row(row) {
                continue;
            }
            let mut row_node = Node::new(NodeKind::TableRow);
            for cell in split_cells(row) {
                let mut cell_node = Node::new(NodeKind::TableCell);
                parse_inline(cell, &mut cell_node);
                row_node.children.push(cell_node);
            }
            if !row_node.children.is_empty() {
                table.children.push(row_node);
            }
        }
        parent.children.push(table);
        return;
    }

    let mut text = line.to_owned();
    *pos += 1;
    while let Some(next) = lines
        .get(*pos)
        .filter(|l| !is_blank(l) && match_heading(l).is_none())
    {
        text.push(' ');
        text.push_str(next);
        *pos += 1;
    }
    let mut paragraph = Node::new(NodeKind::Paragraph);
    parse_inline(&text, &mut paragraph);
    parent.children.push(paragraph);
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Three or more of `-`, `*` and `_` in any mix, optionally padded.
fn is_horizontal_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| matches!(c, '-' | '*' | '_'))
}

/// `#{1,6}` followed by whitespace and at least one more character.
fn match_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let text = after_whitespace(&line[hashes..])?;
    u8::try_from(hashes).ok().map(|level| (level, text))
}

/// Text after a required whitespace run. Whitespace-only input keeps its
/// last character, so `"  "` yields `" "` and `" "` yields `None`.
fn after_whitespace(rest: &str) -> Option<&str> {
    let text = rest.trim_start();
    if text.len() == rest.len() {
        return None;
    }
    if !text.is_empty() {
        return Some(text);
    }
    let last = rest.chars().last()?.len_utf8();
    (rest.len() > last).then(|| &rest[rest.len() - last..])
}

/// Opening fence: ```` ``` ```` plus an optional word, returning the word.
fn match_fence_open(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(FENCE)?;
    let word_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let (language, tail) = rest.split_at(word_len);
    tail.trim().is_empty().then_some(language)
}

fn is_fence_close(line: &str) -> bool {
    line.strip_prefix(FENCE).is_some_and(|tail| tail.trim().is_empty())
}

fn match_quote(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix('>').map(str::trim_start)
}

struct ListItem<'a> {
    ordered: bool,
    text: &'a str,
}

/// A bullet (`-`, `*`, `+`) or numbered (`N.`) item with non-empty text.
fn match_list_item(line: &str) -> Option<ListItem<'_>> {
    let body = line.trim_start();
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();

    let (ordered, after_marker) = if digits > 0 {
        (true, body[digits..].strip_prefix('.')?)
    } else {
        let rest = body
            .strip_prefix('-')
            .or_else(|| body.strip_prefix('*'))
            .or_else(|| body.strip_prefix('+'))?;
        (false, rest)
    };

    let text = after_whitespace(after_marker)?;
    Some(ListItem { ordered, text })
}

/// A row made only of pipes, dashes and whitespace.
fn is_separator_row(line: &str) -> bool {
    line.chars().all(|c| c == '|' || c == '-' || c.is_whitespace())
}

/// Split a table row on `|`, dropping the empty outer segments produced by
/// leading and trailing pipes. Cells are trimmed of spaces and tabs.
fn split_cells(row: &str) -> Vec<&str> {
    let trimmed = row.trim();
    let mut cells: Vec<&str> = trimmed
        .split('|')
        .map(|cell| cell.trim_matches([' ', '\t']))
        .collect();
    if trimmed.ends_with('|') && cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    if trimmed.starts_with('|') && cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    cells
}
