//! CLI error types.

use chisel_config::ConfigError;
use chisel_server::ServerError;
use chisel_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] SiteError),

    #[error("{0}")]
    Server(#[from] ServerError),
}
