//! `chisel serve` command implementation.

use chisel_config::{CliSettings, Config};
use chisel_server::{ServerConfig, run_server};
use clap::Args;

use super::ProjectArgs;
use crate::error::CliError;
use crate::output::Output;

/// Server address overrides.
#[derive(Args, Debug)]
pub(crate) struct AddressArgs {
    /// Host to bind to (overrides config).
    #[arg(long, env = "CHISEL_HOST")]
    pub host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "CHISEL_PORT")]
    pub port: Option<u16>,
}

impl AddressArgs {
    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            ..CliSettings::default()
        }
    }
}

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub address: AddressArgs,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the output directory is
    /// missing, or the server fails.
    pub(crate) async fn execute(&self) -> Result<(), CliError> {
        let config = self.project.load_config(&self.address.settings())?;
        serve(&config).await
    }
}

/// Serve the configured output directory until Ctrl-C.
pub(crate) async fn serve(config: &Config) -> Result<(), CliError> {
    let output = Output::new();
    let server_config = ServerConfig::from_config(config);

    output.highlight(&format!("Serving at {}", server_config.url()));
    output.detail("Root", &server_config.root.display().to_string());
    match server_config.cache_max_age {
        Some(seconds) => output.detail("Cache", &format!("max-age={seconds}")),
        None => output.detail("Cache", "disabled"),
    }
    output.info("Press Ctrl-C to stop");

    run_server(server_config).await?;
    Ok(())
}
