//! Main SOCKS5 handler
//!
//! This module provides the entry point for a single client connection. It
//! orchestrates authentication, request parsing, name resolution, the rule
//! check and command dispatch.

use crate::error::Socks5Error;
use crate::socks::auth::{authenticate, AuthContext};
use crate::socks::command::{parse_request, send_failure, send_success};
use crate::socks::options::Socks5Config;
use crate::socks::tcp_relay::handle_tcp_connect;
use crate::socks::types::{RequestContext, SocksCommand, TargetAddr};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, info, warn};

/// Addresses of the client connection being served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Client address
    pub remote_addr: Option<SocketAddr>,
    /// Server-side address the client connected to
    pub local_addr: Option<SocketAddr>,
}

/// Handle SOCKS5 protocol on a stream
///
/// # Protocol Flow
///
/// 1. Authentication negotiation
/// 2. Username/password authentication (if negotiated)
/// 3. Request parsing and handling, see [`handle_request`]
///
/// The negotiation phase is bounded by the configured request timeout.
pub async fn handle_socks5_on_stream<S>(
    mut stream: S,
    config: &Socks5Config,
    conn: ConnectionInfo,
) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let auth = tokio::time::timeout(config.request_timeout(), authenticate(&mut stream, config))
        .await
        .map_err(|_| timed_out("authentication"))??;

    debug!("Authentication completed with method: {:?}", auth.method);

    handle_request(stream, config, auth, conn).await
}

/// Read one request from an authenticated stream and serve it
///
/// Every failure before the reply is answered with a failure reply, except
/// a version mismatch, which closes the connection silently. Unknown or
/// disabled commands, failed resolution and rule denial never reach the
/// dialer.
pub async fn handle_request<S>(
    mut stream: S,
    config: &Socks5Config,
    auth: AuthContext,
    conn: ConnectionInfo,
) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let parsed = tokio::time::timeout(config.request_timeout(), parse_request(&mut stream))
        .await
        .unwrap_or_else(|_| Err(timed_out("request")));

    let mut request = match parsed {
        Ok(request) => request,
        Err(e) => {
            send_failure(&mut stream, &e).await;
            return Err(e);
        }
    };
    request.auth = auth;
    request.remote_addr = conn.remote_addr;

    info!("SOCKS5 {} request to {}", request.command, request.dest_addr);

    let enabled = match request.command {
        SocksCommand::Connect => true,
        SocksCommand::Bind => config.allow_bind(),
        SocksCommand::UdpAssociate => config.allow_udp(),
        SocksCommand::Unknown(_) => false,
    };
    if !enabled {
        warn!("{} command not supported", request.command);
        let err = Socks5Error::UnsupportedCommand(request.command.to_byte());
        send_failure(&mut stream, &err).await;
        return Err(err);
    }

    let dest = match resolve_destination(&request.dest_addr, config).await {
        Ok(dest) => dest,
        Err(e) => {
            warn!("{}", e);
            send_failure(&mut stream, &e).await;
            return Err(e);
        }
    };

    let (ctx, allowed) = config.rules().allow(RequestContext::new(), &request).await;
    if !allowed {
        warn!(
            "SOCKS5 {} request to {} denied by ruleset",
            request.command, request.dest_addr
        );
        let err = Socks5Error::RuleDenied;
        send_failure(&mut stream, &err).await;
        return Err(err);
    }

    match request.command {
        SocksCommand::Connect => {
            handle_tcp_connect(stream, &request, dest, &ctx, config).await?;
        }
        _ => {
            hold_association(stream, config, &conn).await?;
        }
    }

    Ok(())
}

/// Resolve the destination to a socket address
///
/// Domain names go through the configured resolver exactly once.
async fn resolve_destination(
    addr: &TargetAddr,
    config: &Socks5Config,
) -> Result<SocketAddr, Socks5Error> {
    match addr {
        TargetAddr::Ip(addr) => Ok(*addr),
        TargetAddr::Domain(name, port) => {
            let resolved =
                tokio::time::timeout(config.request_timeout(), config.resolver().resolve(name))
                    .await
                    .unwrap_or_else(|_| {
                        Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            "name resolution timed out",
                        ))
                    });

            match resolved {
                Ok(ip) => {
                    debug!("Resolved {} to {}", name, ip);
                    Ok(SocketAddr::new(ip, *port))
                }
                Err(source) => Err(Socks5Error::ResolutionFailure {
                    name: name.clone(),
                    source,
                }),
            }
        }
    }
}

/// Accept a BIND or UDP ASSOCIATE and keep the control connection open
///
/// The reply carries the bind-IP override, or the address the client
/// connected to, with port 0. The association lives until the client
/// closes the control connection; anything it sends meanwhile is discarded.
async fn hold_association<S>(
    mut stream: S,
    config: &Socks5Config,
    conn: &ConnectionInfo,
) -> Result<(), Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ip = config
        .bind_ip()
        .or_else(|| conn.local_addr.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    send_success(&mut stream, &TargetAddr::from(SocketAddr::new(ip, 0))).await?;

    let mut buf = [0u8; 512];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Control connection error: {}", e);
                break;
            }
        }
    }

    debug!("Association closed by client");
    Ok(())
}

fn timed_out(phase: &str) -> Socks5Error {
    Socks5Error::Io(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timed out during {}", phase),
    ))
}
