//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod dev;
pub(crate) mod serve;

use std::path::PathBuf;

use chisel_config::{CliSettings, Config};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use build::BuildArgs;
pub(crate) use dev::DevArgs;
pub(crate) use serve::ServeArgs;

/// Arguments shared by every command.
#[derive(Args, Debug)]
pub(crate) struct ProjectArgs {
    /// Project directory.
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Path to configuration file (default: auto-discover chisel.toml).
    #[arg(short, long, env = "CHISEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (progress logs and configuration summary).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProjectArgs {
    /// Load configuration for the project with CLI overrides applied.
    pub(crate) fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        let config = Config::load(&self.project, self.config.as_deref(), Some(settings))?;
        tracing::debug!(
            config = ?config.config_path,
            output = %config.paths.output_dir.display(),
            "Configuration loaded"
        );
        if self.verbose {
            print_config_summary(&config);
        }
        Ok(config)
    }
}

/// Print the resolved configuration.
fn print_config_summary(config: &Config) {
    let output = Output::new();
    output.highlight("Configuration");
    if let Some(path) = &config.config_path {
        output.detail("File", &path.display().to_string());
    } else {
        output.detail("File", "none (defaults)");
    }
    output.detail("Site", &config.site.name);
    output.detail("Content", &config.paths.content_dir.display().to_string());
    output.detail("Styles", &config.paths.styles_dir.display().to_string());
    output.detail("Templates", &config.paths.templates_dir.display().to_string());
    output.detail("Output", &config.paths.output_dir.display().to_string());
    output.detail(
        "Dev server",
        &format!("{}:{}", config.dev.host, config.dev.port),
    );
}
