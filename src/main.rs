//! Podbrief CLI entry point.

use anyhow::Result;
use clap::Parser;
use podbrief::cli::{commands, Cli, Commands};
use podbrief::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: u8, configured: &str) {
    let log_level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("podbrief={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(PathBuf::from);

    if let Commands::Config { action } = &cli.command {
        init_logging(cli.verbose, "warn");
        return commands::run_config(action, config_path.as_deref());
    }

    // Load configuration
    let settings = Settings::load_from(config_path.as_deref())?;
    init_logging(cli.verbose, &settings.general.log_level);

    // Execute command
    match &cli.command {
        Commands::Initdb => {
            commands::run_initdb(&settings)?;
        }

        Commands::Fetch => {
            commands::run_fetch(&settings).await?;
        }

        Commands::Transcribe { recent } => {
            commands::run_transcribe(*recent, &settings).await?;
        }

        Commands::Summarize { recent } => {
            commands::run_summarize(*recent, &settings).await?;
        }

        Commands::Digest { days } => {
            commands::run_digest(*days, &settings)?;
        }

        Commands::Purge { dry_run } => {
            commands::run_purge(*dry_run, &settings)?;
        }

        Commands::Status => {
            commands::run_status(&settings)?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
