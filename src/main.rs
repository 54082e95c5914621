//! Letter Export Server
//!
//! Receives editor content from the browser and saves it to Google Docs.

use clap::{Arg, Command};
use letter_export::api::{start_server, AppState};
use letter_export::docs::GoogleDocsClient;
use letter_export::{Config, Error, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("letter-export")
        .version(letter_export::VERSION)
        .about("Exports rich-text letters as formatted Google Docs.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("docs-api")
                .long("docs-api")
                .value_name("URL")
                .help("Google Docs API base URL"),
        )
        .arg(
            Arg::new("drive-api")
                .long("drive-api")
                .value_name("URL")
                .help("Google Drive API base URL"),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(config_path) => Config::load_from(config_path)?,
        None => Config::load()?,
    };

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    letter_export::init_logging(&config.logging.level);
    info!("Starting letter export server v{}", letter_export::VERSION);

    let documents = GoogleDocsClient::new(&config.google)?;
    info!(
        docs = %config.google.docs_api_base,
        drive = %config.google.drive_api_base,
        "Google client ready"
    );

    let addr = config.server.http_addr;
    let state = Arc::new(AppState::new(config, Arc::new(documents)));

    start_server(addr, state, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    if let Some(url) = matches.get_one::<String>("docs-api") {
        config.google.docs_api_base = url.clone();
    }

    if let Some(url) = matches.get_one::<String>("drive-api") {
        config.google.drive_api_base = url.clone();
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C signal, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
