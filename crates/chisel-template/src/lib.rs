//! Template language for Chisel pages.
//!
//! Templates are plain text with `{{ }}` tags:
//!
//! | Tag | Meaning |
//! |---|---|
//! | `{{name}}`, `{{page.title}}` | Interpolate a value (missing values render empty) |
//! | `{{#if cond}}…{{else}}…{{/if}}` | Conditional on [`Value::is_truthy`] |
//! | `{{#each items}}…{{/each}}` | Loop with the element bound to `this` |
//! | `{{#for item in items}}…{{/for}}` | Loop with a named binding |
//! | `{{> name}}` | Include a partial through the engine's partial loader |
//! | `{{#helper arg …}}`, `{{helper arg …}}` | Call a registered helper |
//!
//! Rendering never fails. Unterminated control tags are copied to the output
//! unchanged and other problems are reported as [`Diagnostic`]s alongside the
//! output.
//!
//! # Example
//!
//! ```
//! use chisel_template::{Context, render_template};
//!
//! let context = Context::new()
//!     .with("title", "Release notes")
//!     .with("tags", vec!["rust", "cli"]);
//!
//! let rendered = render_template(
//!     "<h1>{{upper title}}</h1>{{#each tags}}<span>{{this}}</span>{{/each}}",
//!     &context,
//! );
//! assert_eq!(
//!     rendered.output,
//!     "<h1>RELEASE NOTES</h1><span>rust</span><span>cli</span>"
//! );
//! ```

mod engine;
mod helpers;
mod value;

pub use engine::{
    Diagnostic, DiagnosticKind, MAX_DEPTH, PartialLoader, Rendered, TemplateEngine,
    render_template,
};
pub use helpers::{Helper, HelperError, HelperRegistry, HelperResult};
pub use value::{Context, Value};
