//! caleu CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use caleu_client::cli::{Cli, Command, ConfigAction};
use caleu_client::commands;
use caleu_client::config::ClientConfig;
use caleu_client::error::{ClientError, ClientResult};
use caleu_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = match cli.command {
        Command::Run { .. } if cli.debug => TracingConfig::daemon().with_level(Level::DEBUG),
        Command::Run { .. } => TracingConfig::daemon(),
        _ => TracingConfig::cli(cli.debug),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    match cli.command {
        Command::Run { json, no_notify } => commands::run::run(&config, json, !no_notify).await,
        Command::Fetch { json } => commands::fetch::fetch(&config, json).await,
        Command::Config { action } => match action {
            ConfigAction::Path => commands::config::path(&config_path),
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
        },
    }
}
