//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// caleu - Cal.eu booking watcher
#[derive(Debug, Parser)]
#[command(name = "caleu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALEU_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll bookings and report new ones until interrupted
    Run {
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Do not show desktop notifications
        #[arg(long)]
        no_notify: bool,
    },

    /// Run one refresh and print a summary
    Fetch {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the configuration file path
    Path,
    /// Print the effective configuration (API key redacted)
    Dump,
}
