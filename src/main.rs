//! StreamFront - storefront network core CLI
//!
//! # Usage
//!
//! ```bash
//! streamfront component '{"type":"ARCHIVE"}' --ttl 60
//! streamfront details 8f2c series --json
//! streamfront health
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use streamfront::cli::{Cli, Command, ExitCode, Output};
use streamfront::{Config, Storefront};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(&cli);
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs).into(),
    };

    let store = Storefront::new(config);
    let code = run(cli.command, &store, &output).await;
    store.shutdown();
    code.into()
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let default = if verbose { "streamfront=debug" } else { "streamfront=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?.with_env()?,
        None => Config::load()?,
    };
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(project) = cli.project {
        config.project = project;
    }
    Ok(config)
}

async fn run(command: Command, store: &Storefront, output: &Output) -> ExitCode {
    match command {
        Command::Component(cmd) => commands::component_cmd(cmd, store, output).await,
        Command::Details(cmd) => commands::details_cmd(cmd, store, output).await,
        Command::Health(cmd) => commands::health_cmd(cmd, store, output).await,
        Command::Progress(cmd) => commands::progress_cmd(cmd, store, output).await,
        Command::Favourite(cmd) => commands::favourite_cmd(cmd, store, output).await,
        Command::Recent(cmd) => commands::recent_cmd(cmd, store, output).await,
        Command::Pin(cmd) => commands::pin_cmd(cmd, store, output).await,
    }
}
