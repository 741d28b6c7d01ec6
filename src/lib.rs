//! # Socksgate - SOCKS5 Proxy Server
//!
//! Socksgate is a SOCKS5 (RFC 1928) proxy server with optional
//! username/password authentication (RFC 1929). It accepts client
//! connections, negotiates authentication, serves CONNECT requests by
//! relaying bytes to the destination, and lets embedders plug in their own
//! name resolution, access rules, address rewriting and outbound dialing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socksgate::config::load_config;
//! use socksgate::socks::Socks5Config;
//! use socksgate::Server;
//! use std::sync::Arc;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let socks5 = Socks5Config::from_socks_config(&config.server.socks, &config.server.tcp)?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     Server::new(Arc::new(socks5))
//!         .listen_and_serve(&config.server.listen_addr, shutdown_rx)
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> Socksgate -> Target
//! ```
//!
//! Each accepted connection runs on its own task: handshake, request,
//! resolution, rule check, outbound connect, reply, then a bidirectional
//! relay until either side closes.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{ReplyCode, Socks5Error, SocksgateError};
pub use server::Server;

/// Version of the Socksgate library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
