//! Chisel CLI - static site generator.
//!
//! Provides commands for:
//! - `build`: Render the content directory into the output directory
//! - `serve`: Serve a previously built output directory
//! - `dev`: Build, then serve

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, DevArgs, ServeArgs};
use error::CliError;
use output::Output;

/// Chisel - static site generator.
#[derive(Parser, Debug)]
#[command(name = "chisel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the site into the output directory.
    Build(BuildArgs),
    /// Serve the built site.
    Serve(ServeArgs),
    /// Build the site, then serve it.
    Dev(DevArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Build(args) => args.project.verbose,
            Self::Serve(args) => args.project.verbose,
            Self::Dev(args) => args.project.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Build(args) => args.execute().map(|_| ()),
        Commands::Serve(args) => runtime()?.block_on(args.execute()),
        Commands::Dev(args) => runtime()?.block_on(args.execute()),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Runtime::new()?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "chisel",
            "build",
            "site",
            "--config",
            "site/custom.toml",
            "--output-dir",
            "public",
            "--clean",
        ])
        .unwrap();

        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.project.project, PathBuf::from("site"));
        assert_eq!(args.project.config, Some(PathBuf::from("site/custom.toml")));
        assert_eq!(args.output_dir, Some(PathBuf::from("public")));
        assert!(args.clean);
        assert!(!args.project.verbose);
    }

    #[test]
    fn test_parse_build_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["chisel", "build", "-v"]).unwrap();

        assert!(cli.command.verbose());
        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.project.project, PathBuf::from("."));
        assert!(!args.clean);
    }

    #[test]
    fn test_parse_serve_address() {
        let cli =
            Cli::try_parse_from(["chisel", "serve", "--host", "0.0.0.0", "--port", "8080"])
                .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        let settings = args.address.settings();
        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.port, Some(8080));
        assert_eq!(settings.output_dir, None);
    }

    #[test]
    fn test_parse_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["chisel", "serve", "--port", "99999"]).is_err());
    }

    #[test]
    fn test_parse_dev() {
        let cli = Cli::try_parse_from(["chisel", "dev", "--clean", "-p", "4000"]).unwrap();

        let Commands::Dev(args) = cli.command else {
            panic!("expected dev command");
        };
        assert!(args.clean);
        assert_eq!(args.address.port, Some(4000));
    }
}
