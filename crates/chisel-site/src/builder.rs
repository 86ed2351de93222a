//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chisel_config::Config;
use chisel_template::TemplateEngine;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::SiteError;
use crate::context::page_context;
use crate::minify::minify_html;
use crate::page::{Page, directory_indexes};
use crate::scanner::scan_content;
use crate::theme::{Layouts, Stylesheets};

/// Options for a single build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Remove the output directory before building.
    pub clean: bool,
}

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Pages written, including generated indexes.
    pub pages: usize,
    /// Generated directory index pages.
    pub indexes: usize,
    pub stylesheets: usize,
    pub layouts: usize,
    /// Content files that were too large or failed to load.
    pub skipped: usize,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

/// Partial loader reading `<dir>/<name>.html`.
///
/// Names that would escape `dir` load nothing.
pub fn partial_loader(dir: PathBuf) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |name: &str| {
        if name.starts_with('/') || name.split('/').any(|segment| segment == "..") {
            warn!(partial = name, "Refusing partial outside the partials directory");
            return None;
        }
        let path = dir.join(format!("{name}.html"));
        match fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Partial not loaded");
                None
            }
        }
    }
}

/// Builds the output tree for one project.
pub struct SiteBuilder {
    config: Config,
    engine: TemplateEngine,
}

impl SiteBuilder {
    /// Create a builder whose engine loads partials from `<templates>/partials`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let engine =
            TemplateEngine::new().with_partial_loader(partial_loader(config.paths.partials_dir()));
        Self::with_engine(config, engine)
    }

    /// Create a builder with a preconfigured engine.
    #[must_use]
    pub fn with_engine(config: Config, engine: TemplateEngine) -> Self {
        Self { config, engine }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Engine used for layouts, e.g. to register extra helpers.
    pub fn engine_mut(&mut self) -> &mut TemplateEngine {
        &mut self.engine
    }

    /// Build the site into the configured output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the output tree cannot be cleaned or written.
    /// Unreadable or malformed content files are logged and skipped.
    pub fn build(&self, options: &BuildOptions) -> Result<BuildSummary, SiteError> {
        let started = Instant::now();
        let output_dir = &self.config.paths.output_dir;

        if options.clean {
            self.clean_output()?;
        }
        fs::create_dir_all(output_dir).map_err(|e| SiteError::io(output_dir, e))?;

        let stylesheets = Stylesheets::copy(&self.config.paths.styles_dir, output_dir)?;
        let layouts = Layouts::load(&self.config)?;

        let (mut pages, skipped) = self.load_pages();
        let indexes = directory_indexes(&pages);
        let index_count = indexes.len();
        pages.extend(indexes);

        let write = |page: &Page| self.write_page(page, &layouts, &stylesheets);
        if self.config.performance.parallel_processing {
            pages.par_iter().try_for_each(write)?;
        } else {
            pages.iter().try_for_each(write)?;
        }

        let summary = BuildSummary {
            pages: pages.len(),
            indexes: index_count,
            stylesheets: stylesheets.len(),
            layouts: layouts.len(),
            skipped,
            output_dir: output_dir.clone(),
            elapsed: started.elapsed(),
        };
        info!(
            pages = summary.pages,
            indexes = summary.indexes,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed.as_millis(),
            "Site built"
        );
        Ok(summary)
    }

    /// Load every content page, returning the pages and the number skipped.
    ///
    /// Pages are ordered by source path.
    #[must_use]
    pub fn load_pages(&self) -> (Vec<Page>, usize) {
        let scan = scan_content(
            &self.config.paths.content_dir,
            self.config.performance.max_file_size,
        );

        let load = |file: &crate::scanner::ContentRef| -> Option<Page> {
            let source = match fs::read_to_string(&file.path) {
                Ok(source) => source,
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "Skipping unreadable content file");
                    return None;
                }
            };
            match Page::from_source(&source, &file.rel_path) {
                Ok(page) => {
                    debug!(path = %file.rel_path.display(), route = %page.route, "Loaded page");
                    Some(page)
                }
                Err(e) => {
                    warn!(error = %e, "Skipping content file");
                    None
                }
            }
        };

        let loaded: Vec<Option<Page>> = if self.config.performance.parallel_processing {
            scan.files.par_iter().map(load).collect()
        } else {
            scan.files.iter().map(load).collect()
        };
        let failed = loaded.iter().filter(|page| page.is_none()).count();
        let pages = loaded.into_iter().flatten().collect();
        (pages, scan.skipped + failed)
    }

    /// Render `page` into its layout.
    #[must_use]
    pub fn render_page(&self, page: &Page, layouts: &Layouts, stylesheets: &Stylesheets) -> String {
        let (template, layout_styles) = layouts.resolve(&page.meta.layout);
        let styles = stylesheets.links(
            &self.config.build.global_styles,
            layout_styles,
            &page.meta.classes,
        );
        let context = page_context(page, &self.config.site, &styles);

        let rendered = self.engine.render(template, &context);
        rendered.log_diagnostics(&page.meta.layout);

        if self.config.build.minify_html {
            minify_html(&rendered.output)
        } else {
            rendered.output
        }
    }

    fn write_page(
        &self,
        page: &Page,
        layouts: &Layouts,
        stylesheets: &Stylesheets,
    ) -> Result<(), SiteError> {
        let html = self.render_page(page, layouts, stylesheets);
        let path = page.output_path(&self.config.paths.output_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
        }
        fs::write(&path, html).map_err(|e| SiteError::io(&path, e))?;
        debug!(route = %page.route, path = %path.display(), "Wrote page");
        Ok(())
    }

    /// Remove the output directory, refusing to delete the project itself.
    fn clean_output(&self) -> Result<(), SiteError> {
        let output_dir = &self.config.paths.output_dir;
        if !output_dir.exists() {
            return Ok(());
        }
        if same_dir(output_dir, &self.config.paths.project_dir) {
            return Err(SiteError::UnsafeClean(output_dir.clone()));
        }
        fs::remove_dir_all(output_dir).map_err(|e| SiteError::io(output_dir, e))?;
        info!(dir = %output_dir.display(), "Cleaned output directory");
        Ok(())
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
