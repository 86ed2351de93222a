//! Template interpreter.
//!
//! Parsing and evaluation are interleaved over a single scan position. A
//! control block is resolved completely (branch selected, loop unrolled)
//! before the scan moves past its closing marker. Bodies are rendered by a
//! fresh nested interpreter over the body text.
//!
//! Rendering never fails. Malformed tags are re-emitted verbatim and other
//! problems are collected as [`Diagnostic`]s next to the output.

use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::{debug, warn};

use crate::helpers::{HelperRegistry, HelperResult};
use crate::value::{Context, Scope, Value};

/// Maximum nesting of if-branches, loop bodies and partials.
pub const MAX_DEPTH: usize = 64;

/// Loads partial (and layout) source by name.
pub type PartialLoader = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Category of a render diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Unclosed helper call or partial tag, or nesting too deep.
    SyntaxError,
    /// Unknown helper or a helper that failed.
    HelperError,
    /// Partial could not be loaded.
    ParseError,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SyntaxError => "syntax error",
            Self::HelperError => "helper error",
            Self::ParseError => "parse error",
        })
    }
}

/// A non-fatal problem found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Byte offset of the offending tag. Offsets inside if-branches and loop
    /// bodies refer to the outermost template; offsets inside a partial refer
    /// to the partial's own source.
    pub position: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.position, self.message)
    }
}

/// Output of a render call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Log every diagnostic as a warning attributed to `template`.
    pub fn log_diagnostics(&self, template: &str) {
        for diagnostic in &self.diagnostics {
            warn!(
                template,
                kind = %diagnostic.kind,
                position = diagnostic.position,
                "{}",
                diagnostic.message
            );
        }
    }
}

/// Template engine configuration: helper registry and partial loader.
///
/// Engines are plain values. Clone one to customize it without affecting
/// other users; share one across threads by reference.
///
/// # Example
///
/// ```
/// use chisel_template::{Context, TemplateEngine};
///
/// let engine = TemplateEngine::new()
///     .with_partial_loader(|name| (name == "greeting").then(|| "Hi {{name}}".to_owned()));
/// let context = Context::new().with("name", "Ada");
///
/// let rendered = engine.render("{{> greeting}}!", &context);
/// assert_eq!(rendered.output, "Hi Ada!");
/// assert!(rendered.is_clean());
/// ```
#[derive(Clone)]
pub struct TemplateEngine {
    helpers: HelperRegistry,
    partial_loader: Option<PartialLoader>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("helpers", &self.helpers)
            .field("partial_loader", &self.partial_loader.is_some())
            .finish()
    }
}

impl TemplateEngine {
    /// Create an engine with the built-in helpers and no partial loader.
    #[must_use]
    pub fn new() -> Self {
        Self::with_helpers(HelperRegistry::with_builtins())
    }

    /// Create an engine with a specific helper registry.
    #[must_use]
    pub fn with_helpers(helpers: HelperRegistry) -> Self {
        Self {
            helpers,
            partial_loader: None,
        }
    }

    #[must_use]
    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Register a helper, replacing any helper with the same name.
    pub fn register_helper<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&[Value]) -> HelperResult + Send + Sync + 'static,
    {
        self.helpers.register(name, helper);
    }

    /// Set the loader used for `{{> name}}` and layouts.
    pub fn set_partial_loader<F>(&mut self, loader: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.partial_loader = Some(Arc::new(loader));
    }

    /// Builder-style [`set_partial_loader`](Self::set_partial_loader).
    #[must_use]
    pub fn with_partial_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.set_partial_loader(loader);
        self
    }

    #[must_use]
    pub fn has_partial_loader(&self) -> bool {
        self.partial_loader.is_some()
    }

    /// Render `template` against `context`.
    #[must_use]
    pub fn render(&self, template: &str, context: &Context) -> Rendered {
        let root = Scope::Root(context);
        let (output, diagnostics) = Interpreter::new(self, template, &root, 0, 0).run();
        Rendered {
            output,
            diagnostics,
        }
    }

    /// Render `content_template`, then the layout named `layout` with the
    /// result bound to `content`.
    ///
    /// Without a partial loader, or when the layout loads empty, only the
    /// content is rendered.
    #[must_use]
    pub fn render_with_layout(
        &self,
        layout: &str,
        content_template: &str,
        context: &Context,
    ) -> Rendered {
        let layout_source = self
            .partial_loader
            .as_ref()
            .and_then(|load| load(layout))
            .filter(|source| !source.is_empty());
        let Some(layout_source) = layout_source else {
            debug!(layout, "Layout not available, rendering content only");
            return self.render(content_template, context);
        };

        let root = Scope::Root(context);
        let (content, mut diagnostics) =
            Interpreter::new(self, content_template, &root, 0, 0).run();

        let content = Value::String(content);
        let scope = Scope::Bound {
            name: "content",
            value: &content,
            parent: &root,
        };
        let (output, mut layout_diagnostics) =
            Interpreter::new(self, &layout_source, &scope, 0, 0).run();
        diagnostics.append(&mut layout_diagnostics);

        Rendered {
            output,
            diagnostics,
        }
    }
}

/// Render with a shared engine that has the built-in helpers and no
/// partial loader.
#[must_use]
pub fn render_template(template: &str, context: &Context) -> Rendered {
    static DEFAULT_ENGINE: LazyLock<TemplateEngine> = LazyLock::new(TemplateEngine::new);
    DEFAULT_ENGINE.render(template, context)
}

/// A helper argument token.
#[derive(Debug, PartialEq)]
enum Token<'s> {
    /// Quoted literal with the quotes stripped.
    Literal(&'s str),
    /// Number literal or variable reference.
    Word(&'s str),
}

/// Split helper arguments on whitespace outside quotes.
fn tokenize(args: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = args.trim_start();
    while let Some(first) = rest.chars().next() {
        if first == '"' || first == '\'' {
            let body = &rest[1..];
            let (literal, next) = match body.find(first) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            };
            tokens.push(Token::Literal(literal));
            rest = next;
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(Token::Word(&rest[..end]));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    tokens
}

fn parse_number(word: &str) -> Option<f64> {
    let mut chars = word.chars();
    let first = chars.next()?;
    let starts_numeric = first.is_ascii_digit()
        || (matches!(first, '-' | '+' | '.') && chars.next().is_some_and(|c| c.is_ascii_digit()));
    if starts_numeric { word.parse().ok() } else { None }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn is_partial_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')
}

struct Interpreter<'a> {
    engine: &'a TemplateEngine,
    source: &'a str,
    scope: &'a Scope<'a>,
    pos: usize,
    /// Offset of `source` inside the template diagnostics refer to.
    origin: usize,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Interpreter<'a> {
    fn new(
        engine: &'a TemplateEngine,
        source: &'a str,
        scope: &'a Scope<'a>,
        origin: usize,
        depth: usize,
    ) -> Self {
        Self {
            engine,
            source,
            scope,
            pos: 0,
            origin,
            depth,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> (String, Vec<Diagnostic>) {
        let mut out = String::with_capacity(self.source.len());
        while self.pos < self.source.len() {
            let rest = self.rest();
            let Some(offset) = rest.find("{{") else {
                out.push_str(rest);
                self.pos = self.source.len();
                break;
            };
            out.push_str(&rest[..offset]);
            let start = self.pos + offset;
            self.pos = start + 2;
            let rendered = self.tag(start);
            out.push_str(&rendered);
        }
        (out, self.diagnostics)
    }

    /// Classify and evaluate the tag whose `{{` starts at `start`.
    fn tag(&mut self, start: usize) -> String {
        self.skip_whitespace();
        if self.eat_keyword("#if") {
            self.if_block(start)
        } else if self.eat_keyword("#each") {
            self.each_block(start)
        } else if self.eat_keyword("#for") {
            self.for_block(start)
        } else if self.eat(">") {
            self.partial(start)
        } else if self.eat("#") {
            let name = self.take_name();
            self.helper_call(start, name)
        } else {
            self.variable_or_helper(start)
        }
    }

    fn if_block(&mut self, start: usize) -> String {
        self.skip_whitespace();
        let condition = self.take_balanced().trim();
        if !self.eat("}}") {
            return self.verbatim(start);
        }

        let (body, body_start) = self.body_until("{{/if}}");
        let truthy = self.scope.resolve(condition).is_some_and(Value::is_truthy);
        let (branch, branch_start) = match body.find("{{else}}") {
            Some(split) if truthy => (&body[..split], body_start),
            Some(split) => {
                let after = split + "{{else}}".len();
                (&body[after..], body_start + after)
            }
            None if truthy => (body, body_start),
            None => return String::new(),
        };

        let origin = self.origin + branch_start;
        self.render_nested(branch, origin, self.scope)
    }

    fn each_block(&mut self, start: usize) -> String {
        let collection = self.take_name();
        if !self.close_tag() {
            return self.verbatim(start);
        }
        let (body, body_start) = self.body_until("{{/each}}");
        self.render_loop("this", collection, body, body_start)
    }

    fn for_block(&mut self, start: usize) -> String {
        let binding = self.take_name();
        self.skip_whitespace();
        if binding.is_empty() || !self.eat_keyword("in") {
            return self.verbatim(start);
        }
        let collection = self.take_name();
        if !self.close_tag() {
            return self.verbatim(start);
        }
        let (body, body_start) = self.body_until("{{/for}}");
        self.render_loop(binding, collection, body, body_start)
    }

    fn render_loop(
        &mut self,
        binding: &'a str,
        collection: &str,
        body: &'a str,
        body_start: usize,
    ) -> String {
        let Some(Value::Array(items)) = self.scope.resolve(collection) else {
            return String::new();
        };
        let origin = self.origin + body_start;
        let mut out = String::new();
        for item in items {
            let scope = Scope::Bound {
                name: binding,
                value: item,
                parent: self.scope,
            };
            out.push_str(&self.render_nested(body, origin, &scope));
        }
        out
    }

    fn partial(&mut self, start: usize) -> String {
        self.skip_whitespace();
        let name = self.take_while(is_partial_name_char);
        if !self.close_tag() {
            self.record(
                DiagnosticKind::SyntaxError,
                start,
                format!("unclosed partial: {name}"),
            );
            return self.verbatim(start);
        }

        let engine = self.engine;
        let Some(loader) = engine.partial_loader.as_ref() else {
            self.record(
                DiagnosticKind::ParseError,
                start,
                "no partial loader configured".to_owned(),
            );
            return String::new();
        };
        let Some(source) = loader(name).filter(|source| !source.is_empty()) else {
            self.record(
                DiagnosticKind::ParseError,
                start,
                format!("partial not found: {name}"),
            );
            return String::new();
        };

        self.render_nested(&source, 0, self.scope)
    }

    /// `{{name}}` interpolation, or `{{name arg ...}}` helper call.
    fn variable_or_helper(&mut self, start: usize) -> String {
        let name = self.take_name();
        let after_name = self.pos;
        self.skip_whitespace();
        if self.eat("}}") {
            return self
                .scope
                .resolve(name)
                .map(ToString::to_string)
                .unwrap_or_default();
        }
        if name.is_empty() || self.pos == after_name {
            return self.verbatim(start);
        }
        self.helper_call(start, name)
    }

    fn helper_call(&mut self, start: usize, name: &str) -> String {
        self.skip_whitespace();
        let args = self.take_balanced();
        if !self.eat("}}") {
            self.record(
                DiagnosticKind::SyntaxError,
                start,
                format!("unclosed helper call: {name}"),
            );
            return self.verbatim(start);
        }

        let engine = self.engine;
        let Some(helper) = engine.helpers.get(name) else {
            self.record(
                DiagnosticKind::HelperError,
                start,
                format!("unknown helper: {name}"),
            );
            return String::new();
        };

        let values = self.helper_arguments(args);
        match helper(&values) {
            Ok(output) => output,
            Err(err) => {
                self.record(
                    DiagnosticKind::HelperError,
                    start,
                    format!("helper '{name}' failed: {err}"),
                );
                String::new()
            }
        }
    }

    fn helper_arguments(&self, args: &str) -> Vec<Value> {
        tokenize(args)
            .into_iter()
            .map(|token| match token {
                Token::Literal(literal) => Value::from(literal),
                Token::Word(word) => parse_number(word).map_or_else(
                    || self.scope.resolve(word).cloned().unwrap_or_default(),
                    Value::Number,
                ),
            })
            .collect()
    }

    fn render_nested(&mut self, source: &str, origin: usize, scope: &Scope<'_>) -> String {
        if self.depth >= MAX_DEPTH {
            self.record(
                DiagnosticKind::SyntaxError,
                self.pos,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            );
            return String::new();
        }
        let (output, mut diagnostics) =
            Interpreter::new(self.engine, source, scope, origin, self.depth + 1).run();
        self.diagnostics.append(&mut diagnostics);
        output
    }

    fn record(&mut self, kind: DiagnosticKind, position: usize, message: String) {
        self.diagnostics.push(Diagnostic {
            kind,
            message,
            position: self.origin + position,
        });
    }

    /// Exact source bytes consumed since `start`.
    fn verbatim(&self, start: usize) -> String {
        self.source[start..self.pos].to_owned()
    }

    /// Text up to the first literal `closing`, or to the end of input.
    ///
    /// Returns the body and its offset in `source`.
    fn body_until(&mut self, closing: &str) -> (&'a str, usize) {
        let start = self.pos;
        let rest = self.rest();
        match rest.find(closing) {
            Some(end) => {
                self.pos = start + end + closing.len();
                (&rest[..end], start)
            }
            None => {
                self.pos = self.source.len();
                (rest, start)
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Like [`eat`](Self::eat), but only when followed by whitespace, `}`
    /// or the end of input.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        let boundary = after
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == '}');
        if boundary {
            self.pos += keyword.len();
        }
        boundary
    }

    /// Optional whitespace, then `}}`.
    fn close_tag(&mut self) -> bool {
        self.skip_whitespace();
        self.eat("}}")
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !accept(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn take_name(&mut self) -> &'a str {
        self.skip_whitespace();
        self.take_while(is_name_char)
    }

    /// Text up to the first `}` not matched by a preceding `{`.
    fn take_balanced(&mut self) -> &'a str {
        let rest = self.rest();
        let mut depth = 0usize;
        let mut len = rest.len();
        for (i, byte) in rest.bytes().enumerate() {
            match byte {
                b'{' => depth += 1,
                b'}' if depth == 0 => {
                    len = i;
                    break;
                }
                b'}' => depth -= 1,
                _ => {}
            }
        }
        self.pos += len;
        &rest[..len]
    }
}
