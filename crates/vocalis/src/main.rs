// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vocalis - rate-limited, cost-aware voice question answering.
//!
//! This is the binary entry point for the Vocalis service.

mod serve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vocalis_config::VocalisConfig;

/// Vocalis - rate-limited, cost-aware voice question answering.
#[derive(Parser, Debug)]
#[command(name = "vocalis", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway and serve voice requests.
    Serve,
    /// Validate configuration and exit.
    CheckConfig,
    /// Show today's spend from the configured store.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&std::path::Path>) -> VocalisConfig {
    let loaded = match path {
        Some(path) => vocalis_config::load_and_validate_path(path),
        None => vocalis_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            vocalis_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "vocalis: configuration ok (agent.name={}, store={:?}, cache={:?})",
                config.agent.name, config.store.backend, config.cache.backend
            );
            Ok(())
        }
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("vocalis: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("vocalis: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["vocalis", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::try_parse_from(["vocalis", "check-config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));

        let cli = Cli::try_parse_from(["vocalis", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["vocalis", "status", "--config", "/tmp/vocalis.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/vocalis.toml")));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["vocalis", "shell"]).is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vocalis.toml");
        std::fs::write(&path, "[agent]\nname = \"front-desk\"\n").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.agent.name, "front-desk");
    }
}
