//! Content pages: routes, loading and directory indexes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chisel_markdown::{Node, NodeKind, parse_markdown, serialize_html};

use crate::classes::extract_heading_classes;
use crate::frontmatter::{Frontmatter, parse_frontmatter};
use crate::SiteError;

/// A page ready to be placed into a layout.
#[derive(Debug, Clone)]
pub struct Page {
    /// Source file, `None` for generated pages.
    pub source_path: Option<PathBuf>,
    /// URL path such as `/`, `/about` or `/blog/first-post`.
    pub route: String,
    /// Source file stem.
    pub slug: String,
    pub meta: Frontmatter,
    /// Rendered body HTML.
    pub html: String,
}

impl Page {
    /// Build a page from markdown source.
    ///
    /// `rel_path` is the source path relative to the content directory.
    pub fn from_source(source: &str, rel_path: &Path) -> Result<Self, SiteError> {
        let (mut meta, body) =
            parse_frontmatter(source).map_err(|source| SiteError::Frontmatter {
                path: rel_path.to_path_buf(),
                source,
            })?;
        let (body, heading_classes) = extract_heading_classes(body.trim());
        meta.classes.extend(heading_classes);

        let html = serialize_html(&parse_markdown(&body));
        Ok(Self {
            source_path: Some(rel_path.to_path_buf()),
            route: route_for(rel_path),
            slug: slug_for(rel_path),
            meta,
            html,
        })
    }

    /// Title from frontmatter, else the slug.
    #[must_use]
    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.slug)
    }

    /// Output file for this page under `output_dir`.
    ///
    /// `/` maps to `index.html`, index pages to `<route>/index.html` and
    /// everything else to `<route>.html`.
    #[must_use]
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        let route = self.route.trim_start_matches('/');
        if route.is_empty() {
            output_dir.join("index.html")
        } else if self.slug == "index" {
            output_dir.join(route).join("index.html")
        } else {
            output_dir.join(format!("{route}.html"))
        }
    }
}

/// Route for a content file relative to the content directory.
///
/// ```
/// use std::path::Path;
/// use chisel_site::route_for;
///
/// assert_eq!(route_for(Path::new("index.md")), "/");
/// assert_eq!(route_for(Path::new("blog/index.md")), "/blog");
/// assert_eq!(route_for(Path::new("blog/first-post.md")), "/blog/first-post");
/// ```
#[must_use]
pub fn route_for(rel_path: &Path) -> String {
    let segments: Vec<String> = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = format!("/{}", segments.join("/"));

    let route = joined.strip_suffix(".md").unwrap_or(&joined);
    match route.strip_suffix("/index") {
        Some("") => "/".to_owned(),
        Some(dir) => dir.to_owned(),
        None => route.to_owned(),
    }
}

fn slug_for(rel_path: &Path) -> String {
    rel_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parent directory of a route, `None` for top-level routes.
fn route_dir(route: &str) -> Option<&str> {
    let (dir, _) = route.rsplit_once('/')?;
    (!dir.is_empty()).then_some(dir)
}

/// Generate `Index of <dir>` pages.
///
/// A directory gets an index when it holds more than one page and no page
/// already claims its route. Pages are listed in route order.
#[must_use]
pub fn directory_indexes(pages: &[Page]) -> Vec<Page> {
    let mut directories: BTreeMap<&str, Vec<&Page>> = BTreeMap::new();
    for page in pages {
        if let Some(dir) = route_dir(&page.route) {
            directories.entry(dir).or_default().push(page);
        }
    }

    directories
        .into_iter()
        .filter(|(dir, members)| {
            members.len() > 1 && !pages.iter().any(|page| page.route == *dir)
        })
        .map(|(dir, mut members)| {
            members.sort_by(|a, b| a.route.cmp(&b.route));
            index_page(dir, &members)
        })
        .collect()
}

fn index_page(dir: &str, members: &[&Page]) -> Page {
    let title = format!("Index of {dir}");
    let list = members.iter().fold(Node::new(NodeKind::List), |list, page| {
        list.with_child(Node::list_item(false).with_child(Node::link(page.title(), &page.route)))
    });
    let document = Node::document()
        .with_child(Node::heading(1, title.as_str()))
        .with_child(list);

    Page {
        source_path: None,
        route: dir.to_owned(),
        slug: "index".to_owned(),
        meta: Frontmatter {
            title: Some(title),
            ..Frontmatter::default()
        },
        html: serialize_html(&document),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(route: &str, title: &str) -> Page {
        Page {
            source_path: None,
            route: route.to_owned(),
            slug: route.rsplit('/').next().unwrap_or_default().to_owned(),
            meta: Frontmatter {
                title: Some(title.to_owned()),
                ..Frontmatter::default()
            },
            html: String::new(),
        }
    }

    #[test]
    fn test_route_for() {
        assert_eq!(route_for(Path::new("index.md")), "/");
        assert_eq!(route_for(Path::new("about.md")), "/about");
        assert_eq!(route_for(Path::new("blog/index.md")), "/blog");
        assert_eq!(route_for(Path::new("blog/2024/post.md")), "/blog/2024/post");
        assert_eq!(route_for(Path::new("index/index.md")), "/index");
    }

    #[test]
    fn test_slug_is_file_stem() {
        assert_eq!(slug_for(Path::new("blog/first-post.md")), "first-post");
        assert_eq!(slug_for(Path::new("index.md")), "index");
    }

    #[test]
    fn test_output_paths() {
        let out = Path::new("/out");
        let root = Page::from_source("# Home", Path::new("index.md")).unwrap();
        let blog = Page::from_source("# Blog", Path::new("blog/index.md")).unwrap();
        let post = Page::from_source("# Post", Path::new("blog/post.md")).unwrap();

        assert_eq!(root.output_path(out), PathBuf::from("/out/index.html"));
        assert_eq!(blog.output_path(out), PathBuf::from("/out/blog/index.html"));
        assert_eq!(post.output_path(out), PathBuf::from("/out/blog/post.html"));
    }

    #[test]
    fn test_from_source() {
        let source = "---\ntitle: Gallery\nclasses: base-grid\n---\n\n# Photos --- classes[\"wide\"]\n\nSome *nice* shots.\n";
        let page = Page::from_source(source, Path::new("gallery.md")).unwrap();

        assert_eq!(page.route, "/gallery");
        assert_eq!(page.slug, "gallery");
        assert_eq!(page.title(), "Gallery");
        assert_eq!(page.meta.classes, vec!["base-grid".to_owned(), "wide".to_owned()]);
        assert!(page.html.contains("Photos</h1>"), "{}", page.html);
        assert!(!page.html.contains("classes["), "{}", page.html);
        assert!(page.html.contains("<em class=\"italic\">nice</em>"), "{}", page.html);
    }

    #[test]
    fn test_from_source_reports_bad_frontmatter() {
        let err = Page::from_source("---\ntitle: [x\n---\nbody", Path::new("bad.md")).unwrap_err();
        assert!(matches!(err, SiteError::Frontmatter { .. }), "{err:?}");
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let page = Page::from_source("text", Path::new("notes.md")).unwrap();
        assert_eq!(page.title(), "notes");
    }

    #[test]
    fn test_directory_indexes() {
        let pages = vec![
            page("/", "Home"),
            page("/blog/b", "Second"),
            page("/blog/a", "First"),
            page("/docs/only", "Lonely"),
            page("/guides", "Guides"),
            page("/guides/x", "X"),
            page("/guides/y", "Y"),
        ];
        let indexes = directory_indexes(&pages);

        assert_eq!(indexes.len(), 1);
        let index = &indexes[0];
        assert_eq!(index.route, "/blog");
        assert_eq!(index.title(), "Index of /blog");
        assert_eq!(index.output_path(Path::new("out")), PathBuf::from("out/blog/index.html"));
        let first = index.html.find("/blog/a").unwrap();
        let second = index.html.find("/blog/b").unwrap();
        assert!(first < second);
        assert!(index.html.contains(">First</a>"), "{}", index.html);
    }

    #[test]
    fn test_directory_index_keeps_titles_literal() {
        let pages = vec![
            page("/notes/a", "Arrays [1] *and* `slices`"),
            page("/notes/b", "Plain"),
        ];
        let indexes = directory_indexes(&pages);

        assert_eq!(indexes.len(), 1);
        let html = &indexes[0].html;
        assert!(
            html.contains(r#"href="/notes/a">Arrays [1] *and* `slices`</a>"#),
            "{html}"
        );
        assert!(!html.contains("<strong"), "{html}");
        assert!(!html.contains("<em"), "{html}");
        assert!(!html.contains("<code"), "{html}");
    }
}
