//! Configuration management for Chisel.
//!
//! Parses `chisel.toml` with serde and discovers the file in the project
//! directory or any of its parents. Directory settings are resolved against
//! the directory containing the config file.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.name`
//! - `site.base_url`
//! - `site.author`
//! - `dev.host`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "chisel.toml";

/// Lowest port accepted for the development server.
const MIN_PORT: u16 = 1024;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override dev server host.
    pub host: Option<String>,
    /// Override dev server port.
    pub port: Option<u16>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
}

/// Site configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[site]` metadata exposed to templates.
    pub site: SiteConfig,
    /// `[build]` directories and output options.
    pub build: BuildConfig,
    /// Top-level `[layout_styles]`; replaces `build.layout_styles` when present.
    layout_styles: Option<BTreeMap<String, Vec<String>>>,
    /// `[dev]` server settings.
    pub dev: DevConfig,
    /// `[performance]` limits and caching.
    pub performance: PerformanceConfig,

    /// Resolved directories (set after loading).
    #[serde(skip)]
    pub paths: BuildPaths,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    pub description: String,
    pub author: String,
    /// Two-letter code (`en`) or language plus region (`en-US`).
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "My Chisel Site".to_owned(),
            base_url: String::new(),
            description: String::new(),
            author: String::new(),
            language: "en".to_owned(),
        }
    }
}

/// `[build]` section. Directories are relative to the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output_dir: String,
    pub content_dir: String,
    pub styles_dir: String,
    pub templates_dir: String,
    /// Stylesheets linked from every page.
    pub global_styles: Vec<String>,
    /// Stylesheets linked from pages using a given layout.
    pub layout_styles: BTreeMap<String, Vec<String>>,
    /// Trim lines and drop blank lines in written HTML.
    pub minify_html: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: "dist".to_owned(),
            content_dir: "content".to_owned(),
            styles_dir: "styles".to_owned(),
            templates_dir: "templates".to_owned(),
            global_styles: vec!["base".to_owned()],
            layout_styles: BTreeMap::from([
                ("default".to_owned(), Vec::new()),
                ("post".to_owned(), vec!["post".to_owned()]),
            ]),
            minify_html: false,
        }
    }
}

/// `[dev]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 3000,
        }
    }
}

/// `[performance]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Send `Cache-Control: max-age` from the dev server.
    pub enable_cache: bool,
    /// Cache lifetime in seconds.
    pub cache_max_age: u64,
    /// Content files above this many bytes are skipped.
    #[serde(deserialize_with = "deserialize_file_size")]
    pub max_file_size: u64,
    /// Render pages on the rayon thread pool.
    pub parallel_processing: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_max_age: 3600,
            max_file_size: 10 * 1024 * 1024,
            parallel_processing: true,
        }
    }
}

/// Resolved directories.
#[derive(Debug, Clone, Default)]
pub struct BuildPaths {
    /// Directory the relative settings are resolved against.
    pub project_dir: PathBuf,
    pub output_dir: PathBuf,
    pub content_dir: PathBuf,
    pub styles_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl BuildPaths {
    /// Partial templates directory (`<templates>/partials`).
    #[must_use]
    pub fn partials_dir(&self) -> PathBuf {
        self.templates_dir.join("partials")
    }
}

/// Parse a size such as `512`, `64KB`, `10MB` or `1GB` into bytes.
///
/// Suffixes are binary multiples. Returns `None` for anything else.
#[must_use]
pub fn parse_file_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let (digits, multiplier) = if let Some(n) = text.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = text.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = text.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else {
        (text, 1)
    };
    digits.trim().parse::<u64>().ok()?.checked_mul(multiplier)
}

fn deserialize_file_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Bytes(u64),
        Text(String),
    }

    match RawSize::deserialize(deserializer)? {
        RawSize::Bytes(bytes) => Ok(bytes),
        RawSize::Text(text) => parse_file_size(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid max_file_size {text:?}"))
        }),
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Top-level sections accepted in `chisel.toml`.
const SECTIONS: &[&str] = &["site", "build", "layout_styles", "dev", "performance"];

/// Reject top-level tables other than [`SECTIONS`].
fn check_sections(content: &str) -> Result<(), ConfigError> {
    let table: toml::Table = toml::from_str(content)?;
    match table.keys().find(|key| !SECTIONS.contains(&key.as_str())) {
        Some(key) => Err(ConfigError::Validation(format!(
            "Unknown configuration section: {key}"
        ))),
        None => Ok(()),
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration for the project at `project_dir`.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `chisel.toml` in `project_dir` and its parents, falling back to
    /// defaults relative to `project_dir`.
    ///
    /// CLI settings are applied after path resolution and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, the file
    /// cannot be parsed, or validation fails.
    pub fn load(
        project_dir: &Path,
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config(project_dir) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_base(project_dir)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text, resolving directories against `base`.
    ///
    /// # Errors
    ///
    /// Returns error on unknown sections, malformed TOML, unset environment
    /// variables or failed validation.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        check_sections(content)?;
        let mut config: Self = toml::from_str(content)?;

        // Expand environment variables before validation.
        config.expand_env_vars()?;

        if let Some(layout_styles) = config.layout_styles.take() {
            config.build.layout_styles = layout_styles;
        }
        config.resolve_paths(base);
        config.validate()?;

        Ok(config)
    }

    /// Stylesheets required by `layout`, empty for unknown layouts.
    #[must_use]
    pub fn layout_styles(&self, layout: &str) -> &[String] {
        self.build
            .layout_styles
            .get(layout)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.dev.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.dev.port = port;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.paths.output_dir.clone_from(output_dir);
        }
    }

    /// Search for the config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            build: BuildConfig::default(),
            layout_styles: None,
            dev: DevConfig::default(),
            performance: PerformanceConfig::default(),
            paths: BuildPaths::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        self.validate_dev()?;
        if self.performance.max_file_size == 0 {
            return Err(ConfigError::Validation(
                "performance.max_file_size must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.name, "site.name")?;

        let language_len = self.site.language.chars().count();
        if language_len != 0 && language_len != 2 && language_len != 5 {
            return Err(ConfigError::Validation(format!(
                "site.language must look like \"en\" or \"en-US\", got {:?}",
                self.site.language
            )));
        }
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build.output_dir, "build.output_dir")?;
        require_non_empty(&self.build.content_dir, "build.content_dir")?;
        require_non_empty(&self.build.styles_dir, "build.styles_dir")?;
        require_non_empty(&self.build.templates_dir, "build.templates_dir")?;

        let output = &self.paths.output_dir;
        for (dir, field) in [
            (&self.paths.content_dir, "build.content_dir"),
            (&self.paths.styles_dir, "build.styles_dir"),
            (&self.paths.templates_dir, "build.templates_dir"),
        ] {
            if dir == output {
                return Err(ConfigError::Validation(format!(
                    "build.output_dir cannot be the same as {field}"
                )));
            }
        }
        Ok(())
    }

    fn validate_dev(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.dev.host, "dev.host")?;
        if self.dev.port < MIN_PORT {
            return Err(ConfigError::Validation(format!(
                "dev.port must be between {MIN_PORT} and {}, got {}",
                u16::MAX,
                self.dev.port
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.name = expand::expand_env(&self.site.name, "site.name")?;
        self.site.base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;
        self.site.author = expand::expand_env(&self.site.author, "site.author")?;
        self.dev.host = expand::expand_env(&self.dev.host, "dev.host")?;
        Ok(())
    }

    /// Resolve build directories against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        self.paths = BuildPaths {
            project_dir: base.to_path_buf(),
            output_dir: base.join(&self.build.output_dir),
            content_dir: base.join(&self.build.content_dir),
            styles_dir: base.join(&self.build.styles_dir),
            templates_dir: base.join(&self.build.templates_dir),
        };
    }
}
