//! socksgate binary: loads a TOML config and runs the SOCKS5 listener.

use anyhow::{Context, Result};
use clap::Parser;
use socksgate::config::load_config;
use socksgate::socks::Socks5Config;
use socksgate::Server;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Socksgate - SOCKS5 proxy server
#[derive(Parser, Debug)]
#[command(name = "socksgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log filter, a level or directives (e.g. `info`, `socksgate=debug`)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, args.json_log)?;

    let config = load_config(&args.config)?;
    let socks5 = Socks5Config::from_socks_config(&config.server.socks, &config.server.tcp)
        .with_context(|| "Invalid SOCKS5 configuration")?;

    info!("Socksgate v{}", socksgate::VERSION);
    info!("Configuration loaded from: {:?}", args.config);
    info!(
        "Authentication: {:?}, users: {}",
        socks5.auth_methods(),
        config.server.socks.users.len()
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    Server::new(Arc::new(socks5))
        .listen_and_serve(&config.server.listen_addr, shutdown_rx)
        .await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received Ctrl+C, shutting down...");
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `--log-level` when set, so per-module directives such
/// as `socksgate::socks=trace` work without a CLI change.
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {}", level))?,
    };
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
