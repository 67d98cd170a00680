//! CLI module for sipamit-server
//!
//! Provides command-line interface parsing for the sipamit-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SIPAMIT - Device Inspection Inventory Server
///
/// REST backend for IT device inventories and their periodic inspection records.
#[derive(Parser, Debug)]
#[command(
    name = "sipamit-server",
    version,
    about = "SIPAMIT - Device Inspection Inventory Server",
    long_about = "REST backend for IT device inventories and their periodic inspection records.\n\n\
                  Settings are read from the environment (and a .env file if present).\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  sipamit-server                        # Seed if needed, then serve\n    \
                  sipamit-server seed                   # Only run the seeders\n    \
                  sipamit-server --env-file prod.env    # Load a specific env file\n    \
                  sipamit-server hash-password hunter2  # Print an Argon2id hash"
)]
pub struct Cli {
    /// Env file to load instead of ./.env
    #[arg(short, long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Emit JSON log lines (same as LOG_FORMAT=json)
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Skip the start-up seeders
        #[arg(long)]
        no_seed: bool,
    },

    /// Create the superadmin and default checklists if missing
    Seed,

    /// Print the Argon2id PHC hash of a password
    HashPassword {
        /// Plain-text password
        password: String,
    },

    /// Show the effective configuration (secrets redacted)
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `serve` when none was given.
    pub fn action(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { no_seed: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["sipamit-server"]).unwrap();
        assert_eq!(cli.action(), Commands::Serve { no_seed: false });
        assert!(cli.env_file.is_none());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["sipamit-server", "hash-password", "hunter2"]).unwrap();
        assert_eq!(
            cli.action(),
            Commands::HashPassword {
                password: "hunter2".to_string()
            }
        );

        let cli = Cli::try_parse_from(["sipamit-server", "serve", "--no-seed"]).unwrap();
        assert_eq!(cli.action(), Commands::Serve { no_seed: true });

        let cli =
            Cli::try_parse_from(["sipamit-server", "config", "--json", "--env-file", "x.env"])
                .unwrap();
        assert_eq!(cli.action(), Commands::Config { json: true });
        assert_eq!(cli.env_file, Some(PathBuf::from("x.env")));
    }
}
