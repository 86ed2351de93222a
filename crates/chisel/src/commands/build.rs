//! `chisel build` command implementation.

use std::path::PathBuf;

use chisel_config::CliSettings;
use chisel_site::{BuildOptions, BuildSummary, SiteBuilder};
use clap::Args;

use super::ProjectArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory (overrides config).
    #[arg(short, long, env = "CHISEL_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Remove the output directory before building.
    #[arg(long)]
    pub clean: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or output cannot be written.
    pub(crate) fn execute(&self) -> Result<BuildSummary, CliError> {
        let settings = CliSettings {
            output_dir: self.output_dir.clone(),
            ..CliSettings::default()
        };
        let builder = SiteBuilder::new(self.project.load_config(&settings)?);
        build_site(&builder, self.clean)
    }
}

/// Build the site and report the result.
pub(crate) fn build_site(builder: &SiteBuilder, clean: bool) -> Result<BuildSummary, CliError> {
    let output = Output::new();
    let config = builder.config();

    output.info(&format!(
        "Building {} from {}",
        config.site.name,
        config.paths.content_dir.display()
    ));

    let summary = builder.build(&BuildOptions { clean })?;

    output.success(&format!(
        "Built {} pages ({} indexes) into {} in {} ms",
        summary.pages,
        summary.indexes,
        summary.output_dir.display(),
        summary.elapsed.as_millis()
    ));
    if summary.skipped > 0 {
        output.info(&format!(
            "Skipped {} content files (see warnings above)",
            summary.skipped
        ));
    }
    Ok(summary)
}
