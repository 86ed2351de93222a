//! `chisel dev` command implementation.

use chisel_site::SiteBuilder;
use clap::Args;

use super::ProjectArgs;
use super::build::build_site;
use super::serve::{AddressArgs, serve};
use crate::error::CliError;

/// Arguments for the dev command.
#[derive(Args, Debug)]
pub(crate) struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub address: AddressArgs,

    /// Remove the output directory before building.
    #[arg(long)]
    pub clean: bool,
}

impl DevArgs {
    /// Build the site, then serve it.
    ///
    /// # Errors
    ///
    /// Returns an error if the build fails or the server fails.
    pub(crate) async fn execute(&self) -> Result<(), CliError> {
        let builder = SiteBuilder::new(self.project.load_config(&self.address.settings())?);
        build_site(&builder, self.clean)?;
        serve(builder.config()).await
    }
}
