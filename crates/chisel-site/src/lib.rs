//! Content loading and static output for Chisel sites.
//!
//! A project has four directories, all configured in `chisel.toml`:
//!
//! - `content/` - markdown pages with optional YAML frontmatter
//! - `styles/` - stylesheets copied to `<output>/styles/`
//! - `templates/` - layouts (`<name>.html`) and partials (`partials/<name>.html`)
//! - `dist/` - the generated site
//!
//! [`SiteBuilder::build`] scans the content, renders each page through
//! `chisel-markdown`, places it into its layout with `chisel-template` and
//! writes the result.

mod builder;
mod classes;
mod context;
mod frontmatter;
mod minify;
mod page;
mod scanner;
mod theme;

use std::path::{Path, PathBuf};

pub use builder::{BuildOptions, BuildSummary, SiteBuilder, partial_loader};
pub use classes::extract_heading_classes;
pub use context::page_context;
pub use frontmatter::{
    DEFAULT_LAYOUT, Frontmatter, FrontmatterError, parse_frontmatter, split_frontmatter,
};
pub use minify::minify_html;
pub use page::{Page, directory_indexes, route_for};
pub use theme::{BUILTIN_LAYOUT, Layout, Layouts, Stylesheets};

/// Error returned while building a site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Filesystem error at a specific path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Content file with unusable frontmatter.
    #[error("{}: {source}", path.display())]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
    /// Output directory is the project directory.
    #[error("refusing to clean {}: it is the project directory", .0.display())]
    UnsafeClean(PathBuf),
}

impl SiteError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
