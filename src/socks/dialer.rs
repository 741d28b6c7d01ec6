//! Outbound TCP connections
//!
//! The [`Dialer`] opens the connection to the resolved destination of a
//! CONNECT request. [`TcpDialer`] is the default and applies the
//! configured socket options.

use crate::config::TcpConfig;
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};

/// Options set on each outbound socket after it connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOpts {
    /// TCP_NODELAY
    pub nodelay: bool,
    /// Keepalive idle time and probe interval
    pub keepalive: Option<(Duration, Duration)>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts::from_tcp_config(&TcpConfig::default())
    }
}

impl SocketOpts {
    /// Take the options from the `[server.tcp]` table
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive: config.keepalive(),
        }
    }

    /// Set the options on a connected stream
    pub fn apply(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if let Some((idle, interval)) = self.keepalive {
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(idle)
                .with_interval(interval);
            socket2::SockRef::from(stream).set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Opens outbound TCP connections
#[async_trait]
pub trait Dialer: Send + Sync + Debug {
    /// Connect to `addr`
    async fn dial(&self, addr: SocketAddr) -> io::Result<TcpStream>;
}

/// Plain TCP dialer
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    socket_opts: SocketOpts,
    local_ip: Option<IpAddr>,
}

impl TcpDialer {
    /// Create a dialer with the given socket options
    pub fn new(socket_opts: SocketOpts) -> Self {
        TcpDialer {
            socket_opts,
            local_ip: None,
        }
    }

    /// Bind outbound sockets to `ip` before connecting
    pub fn with_local_ip(mut self, ip: IpAddr) -> Self {
        self.local_ip = Some(ip);
        self
    }

    /// Local IP outbound sockets are bound to, if any
    pub fn local_ip(&self) -> Option<IpAddr> {
        self.local_ip
    }

    /// Socket options applied to every connection
    pub fn socket_opts(&self) -> &SocketOpts {
        &self.socket_opts
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = match self.local_ip {
            Some(ip) => {
                let socket = if addr.is_ipv4() {
                    TcpSocket::new_v4()?
                } else {
                    TcpSocket::new_v6()?
                };
                socket.bind(SocketAddr::new(ip, 0))?;
                socket.connect(addr).await?
            }
            None => TcpStream::connect(addr).await?,
        };

        if let Err(e) = self.socket_opts.apply(&stream) {
            tracing::warn!("Could not set socket options for {}: {}", addr, e);
        }
        tracing::debug!("Dialed {}", addr);

        Ok(stream)
    }
}
