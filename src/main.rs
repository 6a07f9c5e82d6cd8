//! QueryTube CLI entry point.

use anyhow::Result;
use clap::Parser;
use querytube::cli::{commands, Cli, Commands};
use querytube::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("querytube={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            proxy_url,
        } => {
            commands::run_serve(host, port, proxy_url, settings).await?;
        }

        Commands::Ask {
            video_id,
            query,
            language,
            server,
        } => {
            commands::run_ask(&video_id, &query, &language, &server).await?;
        }

        Commands::Transcript { video_id, language } => {
            commands::run_transcript(&video_id, language, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
