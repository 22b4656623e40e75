//! Mathmate CLI entry point.

use anyhow::Result;
use clap::Parser;
use mathmate::cli::{commands, Cli, Commands};
use mathmate::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("mathmate={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        None | Some(Commands::Chat) => {
            commands::run_chat(settings).await?;
        }

        Some(Commands::Ask { question }) => {
            commands::run_ask(question, settings).await?;
        }

        Some(Commands::Serve { host, port }) => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
