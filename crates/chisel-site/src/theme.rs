//! Stylesheets and layouts.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chisel_config::Config;
use tracing::{debug, info, warn};

use crate::SiteError;

/// Layout used when neither the requested nor the `default` layout exists.
pub const BUILTIN_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="{{site_language}}">
<head>
    <meta charset="utf-8">
    <title>{{title}}</title>
    {{styles}}
</head>
<body>
{{content}}
</body>
</html>
"#;

const FALLBACK_LAYOUT: &str = "default";

/// Stylesheet name without a trailing `.css`.
fn style_name(name: &str) -> &str {
    name.strip_suffix(".css").unwrap_or(name)
}

/// List the files directly in `dir` with the given extension, sorted by name.
///
/// A missing directory yields an empty list.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, SiteError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| SiteError::io(dir, e))?;
    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    Ok(files)
}

/// Stylesheets available under `/styles/`.
#[derive(Debug, Clone, Default)]
pub struct Stylesheets {
    names: BTreeSet<String>,
}

impl Stylesheets {
    /// Copy every `*.css` in `styles_dir` into `<output_dir>/styles/`.
    pub fn copy(styles_dir: &Path, output_dir: &Path) -> Result<Self, SiteError> {
        let files = files_with_extension(styles_dir, "css")?;
        if files.is_empty() {
            debug!(dir = %styles_dir.display(), "No stylesheets found");
            return Ok(Self::default());
        }

        let target_dir = output_dir.join("styles");
        fs::create_dir_all(&target_dir).map_err(|e| SiteError::io(&target_dir, e))?;

        let mut names = BTreeSet::new();
        for file in files {
            let (Some(stem), Some(file_name)) = (file.file_stem(), file.file_name()) else {
                continue;
            };
            let target = target_dir.join(file_name);
            fs::copy(&file, &target).map_err(|e| SiteError::io(&file, e))?;
            debug!(stylesheet = %target.display(), "Copied stylesheet");
            names.insert(stem.to_string_lossy().into_owned());
        }
        info!(count = names.len(), "Copied stylesheets");
        Ok(Self { names })
    }

    /// Stylesheets known by name, without copying anything.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| style_name(name.as_ref()).to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(style_name(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `<link>` tags for global, layout and page styles, in that order.
    ///
    /// Names without a stylesheet are skipped and repeats are dropped.
    #[must_use]
    pub fn links(&self, global: &[String], layout: &[String], page: &[String]) -> String {
        let mut seen = BTreeSet::new();
        global
            .iter()
            .chain(layout)
            .chain(page)
            .map(|name| style_name(name))
            .filter(|name| self.names.contains(*name) && seen.insert(*name))
            .map(|name| format!("<link rel=\"stylesheet\" href=\"/styles/{name}.css\">"))
            .collect::<Vec<_>>()
            .join("\n    ")
    }
}

/// A page layout template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub template: String,
    /// Stylesheets from `layout_styles`.
    pub styles: Vec<String>,
}

/// Layouts loaded from the templates directory.
#[derive(Debug, Clone, Default)]
pub struct Layouts {
    layouts: BTreeMap<String, Layout>,
}

impl Layouts {
    /// Load every `*.html` directly in the templates directory.
    pub fn load(config: &Config) -> Result<Self, SiteError> {
        let mut layouts = BTreeMap::new();
        for file in files_with_extension(&config.paths.templates_dir, "html")? {
            let Some(name) = file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let template = match fs::read_to_string(&file) {
                Ok(template) => template,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Skipping unreadable layout");
                    continue;
                }
            };
            let styles = config.layout_styles(&name).to_vec();
            debug!(layout = %name, "Loaded layout");
            layouts.insert(name, Layout { template, styles });
        }
        Ok(Self { layouts })
    }

    /// Register a layout directly.
    pub fn insert(&mut self, name: impl Into<String>, layout: Layout) {
        self.layouts.insert(name.into(), layout);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Template and required styles for `name`.
    ///
    /// Unknown names use the `default` layout's template without its styles,
    /// then the built-in layout.
    #[must_use]
    pub fn resolve(&self, name: &str) -> (&str, &[String]) {
        if let Some(layout) = self.layouts.get(name) {
            return (layout.template.as_str(), layout.styles.as_slice());
        }
        let template = self
            .layouts
            .get(FALLBACK_LAYOUT)
            .map_or(BUILTIN_LAYOUT, |layout| layout.template.as_str());
        (template, &[])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_links_order_and_filtering() {
        let styles = Stylesheets::from_names(["base", "post", "wide"]);
        let links = styles.links(
            &names(&["base.css", "missing"]),
            &names(&["post"]),
            &names(&["wide", "base"]),
        );
        assert_eq!(
            links,
            "<link rel=\"stylesheet\" href=\"/styles/base.css\">\n    \
             <link rel=\"stylesheet\" href=\"/styles/post.css\">\n    \
             <link rel=\"stylesheet\" href=\"/styles/wide.css\">"
        );
    }

    #[test]
    fn test_links_empty_without_stylesheets() {
        let styles = Stylesheets::default();
        assert_eq!(styles.links(&names(&["base"]), &[], &[]), "");
        assert!(styles.is_empty());
    }

    #[test]
    fn test_copy_stylesheets() {
        let dir = tempfile::tempdir().unwrap();
        let styles_dir = dir.path().join("styles");
        let output_dir = dir.path().join("dist");
        fs::create_dir_all(&styles_dir).unwrap();
        fs::write(styles_dir.join("base.css"), "body{}").unwrap();
        fs::write(styles_dir.join("notes.txt"), "ignored").unwrap();

        let styles = Stylesheets::copy(&styles_dir, &output_dir).unwrap();

        assert_eq!(styles.len(), 1);
        assert!(styles.contains("base"));
        assert!(styles.contains("base.css"));
        assert_eq!(
            fs::read_to_string(output_dir.join("styles/base.css")).unwrap(),
            "body{}"
        );
        assert!(!output_dir.join("styles/notes.txt").exists());
    }

    #[test]
    fn test_copy_without_styles_dir() {
        let dir = tempfile::tempdir().unwrap();
        let styles = Stylesheets::copy(&dir.path().join("nope"), dir.path()).unwrap();
        assert!(styles.is_empty());
    }

    #[test]
    fn test_load_layouts_with_styles() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default_with_base(dir.path());
        fs::create_dir_all(config.paths.partials_dir()).unwrap();
        fs::write(config.paths.templates_dir.join("post.html"), "POST {{content}}").unwrap();
        fs::write(config.paths.partials_dir().join("nav.html"), "nav").unwrap();

        let layouts = Layouts::load(&config).unwrap();

        assert_eq!(layouts.len(), 1);
        let (template, styles) = layouts.resolve("post");
        assert_eq!(template, "POST {{content}}");
        assert_eq!(styles, ["post".to_owned()]);
    }

    #[test]
    fn test_resolve_fallbacks() {
        let mut layouts = Layouts::default();
        assert_eq!(layouts.resolve("anything").0, BUILTIN_LAYOUT);

        layouts.insert(
            "default",
            Layout {
                template: "DEFAULT".to_owned(),
                styles: names(&["base"]),
            },
        );
        let (template, styles) = layouts.resolve("gallery");
        assert_eq!(template, "DEFAULT");
        assert!(styles.is_empty());
        assert_eq!(layouts.resolve("default").1, ["base".to_owned()]);
    }
}
