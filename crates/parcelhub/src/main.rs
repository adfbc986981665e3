// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parcelhub - parcel-delivery marketplace backend.
//!
//! This is the binary entry point for the parcelhub server.

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parcelhub_config::ParcelhubConfig;

/// Parcelhub - parcel-delivery marketplace backend.
#[derive(Parser, Debug)]
#[command(name = "parcelhub", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (the default).
    Serve,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already carry everything.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            parcelhub_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config => match render_config(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<ParcelhubConfig, Vec<parcelhub_config::ConfigError>> {
    match path {
        Some(path) => parcelhub_config::load_and_validate_path(path),
        None => parcelhub_config::load_and_validate(),
    }
}

/// Renders the configuration as TOML with every secret redacted.
fn render_config(config: &ParcelhubConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&config.redacted())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::parse_from(["parcelhub"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());

        let cli = Cli::parse_from(["parcelhub", "config", "--config", "/tmp/p.toml"]);
        assert!(matches!(cli.command, Some(Commands::Config)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn rendered_config_hides_secrets() {
        let config = parcelhub_config::load_and_validate_str(
            r#"
[identity]
api_key = "AIza-very-secret"

[payments]
secret_key = "sk_test_very_secret"
"#,
        )
        .expect("config should be valid");

        let text = render_config(&config).unwrap();
        assert!(!text.contains("very-secret"));
        assert!(!text.contains("very_secret"));
        assert!(text.contains("[redacted]"));
        assert!(text.contains("[server]"));
    }
}
