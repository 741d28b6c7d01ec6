//! SOCKS5 listener
//!
//! Accepts client connections and serves each one on its own task until a
//! shutdown signal arrives.

use crate::socks::{handle_socks5_on_stream, ConnectionInfo, Socks5Config};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept, e.g. when the process is out of descriptors
const ACCEPT_ERROR_DELAY: Duration = Duration::from_millis(100);

/// SOCKS5 server
#[derive(Debug, Clone)]
pub struct Server {
    config: Arc<Socks5Config>,
}

impl Server {
    /// Create a server sharing `config` across all connections
    pub fn new(config: Arc<Socks5Config>) -> Self {
        Server { config }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Socks5Config {
        &self.config
    }

    /// Bind `addr` and serve until shutdown
    pub async fn listen_and_serve(
        &self,
        addr: &str,
        shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener, shutdown_rx).await
    }

    /// Accept connections on `listener` until shutdown
    ///
    /// Connections already being served are not interrupted; they finish on
    /// their own tasks.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        let local_addr = listener
            .local_addr()
            .with_context(|| "Failed to read listener address")?;
        info!("SOCKS5 server listening on {}", local_addr);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_conn(stream, peer),
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_DELAY).await;
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    fn spawn_conn(&self, stream: TcpStream, peer: SocketAddr) {
        let server = self.clone();

        tokio::spawn(async move {
            if let Err(e) = server.serve_conn(stream, peer).await {
                warn!("Connection error: {:#}", e);
            }
        });
    }

    /// Serve one accepted client connection to completion
    pub async fn serve_conn(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        debug!("Accepted connection from {}", peer);

        let conn = ConnectionInfo {
            remote_addr: Some(peer),
            local_addr: stream.local_addr().ok(),
        };

        handle_socks5_on_stream(stream, &self.config, conn)
            .await
            .with_context(|| format!("SOCKS5 session with {} failed", peer))?;

        debug!("Connection from {} closed", peer);
        Ok(())
    }
}
