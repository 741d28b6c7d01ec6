//! TCP relay for SOCKS5 CONNECT command
//!
//! Handles TCP CONNECT requests by establishing a connection to the target
//! and relaying data bidirectionally.

use crate::error::{ReplyCode, Socks5Error};
use crate::socks::command::{send_failure, send_success};
use crate::socks::consts::DEFAULT_BUFFER_SIZE;
use crate::socks::options::Socks5Config;
use crate::socks::types::{Request, RequestContext, TargetAddr};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Byte counts for a finished relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Bytes copied from the client to the target
    pub client_to_target: u64,
    /// Bytes copied from the target to the client
    pub target_to_client: u64,
}

/// Handle TCP CONNECT command
///
/// This function:
/// 1. Applies the destination rewrite, if configured
/// 2. Establishes a TCP connection to the target
/// 3. Sends a success reply with the (possibly rewritten) bound address
/// 4. Relays data bidirectionally between client and target
///
/// A failed or timed out connect is answered with the nearest reply code
/// and is never retried.
pub async fn handle_tcp_connect<S>(
    mut client_stream: S,
    request: &Request,
    dest: SocketAddr,
    ctx: &RequestContext,
    config: &Socks5Config,
) -> Result<RelayStats, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let dest = match config.rewriter() {
        Some(rewriter) => rewriter.rewrite_destination(ctx, request, dest),
        None => dest,
    };

    debug!("Connecting to target: {}", dest);

    // Connect to target with timeout
    let connect = tokio::time::timeout(config.connect_timeout(), config.dialer().dial(dest));
    let target_stream = match connect.await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            error!("Failed to connect to {}: {}", dest, e);
            let err = Socks5Error::OutboundConnect {
                code: ReplyCode::from(&e),
                source: e,
            };
            send_failure(&mut client_stream, &err).await;
            return Err(err);
        }
        Err(_) => {
            error!("Connection timeout to {}", dest);
            let err = Socks5Error::OutboundConnect {
                code: ReplyCode::HostUnreachable,
                source: io::Error::new(io::ErrorKind::TimedOut, "connection timed out"),
            };
            send_failure(&mut client_stream, &err).await;
            return Err(err);
        }
    };

    // Get local address for reply
    let bound = match target_stream.local_addr() {
        Ok(local) => {
            let local = match config.rewriter() {
                Some(rewriter) => rewriter.rewrite_bound(ctx, request, local),
                None => local,
            };
            TargetAddr::from(local)
        }
        Err(e) => {
            debug!("Failed to read local address: {}", e);
            TargetAddr::unspecified()
        }
    };

    send_success(&mut client_stream, &bound).await?;

    info!("SOCKS5 tunnel established to {}", dest);

    let stats = relay_tcp(client_stream, target_stream).await;
    debug!(
        "Tunnel to {} closed: {} bytes up, {} bytes down",
        dest, stats.client_to_target, stats.target_to_client
    );

    Ok(stats)
}

/// Relay data bidirectionally between two streams
///
/// Runs both copy directions concurrently. EOF from the client only
/// half-closes the target, so the destination can still answer. EOF from
/// the target, or an error in either direction, shuts down the write side
/// being fed and stops the other direction at its next read. Returns once
/// both directions have finished; both streams are dropped on return.
pub async fn relay_tcp<A, B>(client: A, target: B) -> RelayStats
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut target_read, mut target_write) = tokio::io::split(target);
    let closing = CancellationToken::new();

    let (up, down) = tokio::join!(
        copy_until_closed(&mut client_read, &mut target_write, &closing, false),
        copy_until_closed(&mut target_read, &mut client_write, &closing, true),
    );

    RelayStats {
        client_to_target: finished("client->target", up),
        target_to_client: finished("target->client", down),
    }
}

fn finished(direction: &str, (bytes, result): (u64, io::Result<()>)) -> u64 {
    match result {
        Ok(()) => debug!("{} finished: {} bytes", direction, bytes),
        Err(e) => debug!("{} error after {} bytes: {}", direction, bytes, e),
    }
    bytes
}

/// Copy `reader` into `writer` one chunk at a time until EOF, an error, or
/// cancellation, and return the bytes copied with the outcome
///
/// Only a pending read is interrupted by cancellation, so a chunk that has
/// been read is always written out. `eof_ends_relay` decides whether a clean
/// EOF also stops the opposite direction.
async fn copy_until_closed<R, W>(
    reader: &mut R,
    writer: &mut W,
    closing: &CancellationToken,
    eof_ends_relay: bool,
) -> (u64, io::Result<()>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; DEFAULT_BUFFER_SIZE];
    let mut total = 0u64;

    let result = loop {
        let n = tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(e),
            },
            _ = closing.cancelled() => break Ok(()),
        };

        if let Err(e) = writer.write_all(&buf[..n]).await {
            break Err(e);
        }
        total += n as u64;
    };

    // Propagate EOF downstream
    let _ = writer.shutdown().await;
    if eof_ends_relay || result.is_err() {
        closing.cancel();
    }

    (total, result)
}
