//! Markdown document model, parser and serializers.
//!
//! This crate turns loosely-structured markdown text into a typed [`Node`]
//! tree and renders that tree either to HTML or back to canonical markdown.
//!
//! # Architecture
//!
//! ```text
//! text ──► block parser ──► inline parser ──► Node tree
//!                                                │
//!                          ┌─────────────────────┴──────────────────┐
//!                          ▼                                        ▼
//!                 HtmlNode tree ──► HTML string           canonical markdown
//! ```
//!
//! Parsing never fails: an unmatched line always becomes a paragraph and
//! unmatched inline text always becomes a text node.
//!
//! # Example
//!
//! ```
//! use chisel_markdown::{parse_markdown, serialize_html};
//!
//! let doc = parse_markdown("# Hello\n\nSome **bold** text");
//! let html = serialize_html(&doc);
//! assert!(html.contains(r#"<h1 class="heading-primary">Hello</h1>"#));
//! assert!(html.contains(r#"<strong class="bold">bold</strong>"#));
//! ```

mod block;
mod html;
mod inline;
mod markdown;
mod node;

pub use block::parse_markdown;
pub use html::{HtmlNode, escape_html, serialize_html, to_html_node};
pub use inline::parse_inline;
pub use markdown::serialize_markdown;
pub use node::{Attributes, Node, NodeKind};
