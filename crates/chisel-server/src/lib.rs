//! Development HTTP server for Chisel sites.
//!
//! Serves a built output directory unmodified:
//! - `/` and directory paths serve `index.html`
//! - extensionless paths such as `/about` fall back to `about.html`
//! - `Cache-Control` follows the `[performance]` settings
//!
//! ```text
//! Browser ──HTTP──► axum router (chisel-server)
//!                        │
//!                        ├─► TraceLayer, Cache-Control, nosniff
//!                        │
//!                        └─► ServeDir(output) ──► <route>.html fallback ──► 404 page
//! ```

mod app;
mod middleware;
mod pages;

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::lookup_host;

pub use app::create_router;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served at `/`.
    pub root: PathBuf,
    /// Browser cache lifetime in seconds, `None` sends `no-cache`.
    pub cache_max_age: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 3000,
            root: PathBuf::from("dist"),
            cache_max_age: Some(3600),
        }
    }
}

impl ServerConfig {
    /// Server settings for a loaded site configuration.
    #[must_use]
    pub fn from_config(config: &chisel_config::Config) -> Self {
        let performance = &config.performance;
        Self {
            host: config.dev.host.clone(),
            port: config.dev.port,
            root: config.paths.output_dir.clone(),
            cache_max_age: performance
                .enable_cache
                .then_some(performance.cache_max_age),
        }
    }

    /// URL printed for users.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Error returned by [`run_server`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Nothing to serve.
    #[error("Output directory not found: {}. Build the site first with 'chisel build'", .0.display())]
    RootNotFound(PathBuf),
    /// Host did not resolve to any address.
    #[error("Cannot resolve address {0}")]
    Address(String),
    /// Bind or serve failure.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the root directory is missing, the address cannot be
/// resolved or bound, or serving fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if !config.root.is_dir() {
        return Err(ServerError::RootNotFound(config.root));
    }

    let addr = resolve_addr(&config.host, config.port).await?;
    let app = create_router(&config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, root = %config.root.display(), "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    let target = format!("{host}:{port}");
    let addr = lookup_host(target.as_str())
        .await
        .map_err(|_| ServerError::Address(target.clone()))?
        .next();
    addr.ok_or(ServerError::Address(target))
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_config() {
        let config = chisel_config::Config::default_with_base(Path::new("/site"));
        let server = ServerConfig::from_config(&config);

        assert_eq!(server.host, "localhost");
        assert_eq!(server.port, 3000);
        assert_eq!(server.root, PathBuf::from("/site/dist"));
        assert_eq!(server.cache_max_age, Some(3600));
        assert_eq!(server.url(), "http://localhost:3000");
    }

    #[test]
    fn test_from_config_cache_disabled() {
        let mut config = chisel_config::Config::default_with_base(Path::new("/site"));
        config.performance.enable_cache = false;

        assert_eq!(ServerConfig::from_config(&config).cache_max_age, None);
    }

    #[tokio::test]
    async fn test_run_server_requires_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            root: dir.path().join("dist"),
            ..ServerConfig::default()
        };

        let err = run_server(config).await.unwrap_err();
        assert!(matches!(err, ServerError::RootNotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_resolve_addr() {
        let addr = resolve_addr("127.0.0.1", 4000).await.unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:4000");
    }

    #[tokio::test]
    async fn test_resolve_addr_localhost() {
        let addr = resolve_addr("localhost", 4000).await.unwrap();
        assert!(addr.ip().is_loopback(), "{addr}");
        assert_eq!(addr.port(), 4000);
    }

    #[tokio::test]
    async fn test_resolve_addr_rejects_unknown_host() {
        let err = resolve_addr("no-such-host.invalid", 4000).await.unwrap_err();
        match err {
            ServerError::Address(target) => assert_eq!(target, "no-such-host.invalid:4000"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
