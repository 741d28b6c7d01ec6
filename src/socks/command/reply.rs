//! SOCKS5 reply builder
//!
//! Constructs SOCKS5 reply messages.

use crate::error::{ReplyCode, Socks5Error};
use crate::socks::consts::*;
use crate::socks::types::TargetAddr;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Encode a SOCKS5 reply
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The address portion uses the same encoding the request parser decodes.
pub fn encode_reply(code: ReplyCode, bound: &TargetAddr) -> Vec<u8> {
    let mut reply = vec![SOCKS5_VERSION, code.into(), SOCKS5_RESERVED];
    reply.extend_from_slice(&bound.to_bytes());
    reply
}

/// Build and send a SOCKS5 reply
///
/// # Arguments
///
/// * `stream` - The stream to write to
/// * `code` - The reply status code
/// * `bound` - The bound address (optional, defaults to 0.0.0.0:0)
pub async fn send_reply<S>(
    stream: &mut S,
    code: ReplyCode,
    bound: Option<&TargetAddr>,
) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    let reply = match bound {
        Some(addr) => encode_reply(code, addr),
        None => encode_reply(code, &TargetAddr::unspecified()),
    };

    stream.write_all(&reply).await?;
    stream.flush().await?;

    Ok(())
}

/// Send a success reply carrying the bound address
pub async fn send_success<S>(stream: &mut S, bound: &TargetAddr) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, ReplyCode::Succeeded, Some(bound)).await
}

/// Send the failure reply that matches an error, if it has one
///
/// Best effort: a write failure here is logged and swallowed, since the
/// connection is being torn down anyway.
pub async fn send_failure<S>(stream: &mut S, error: &Socks5Error)
where
    S: AsyncWrite + Unpin,
{
    if let Some(code) = error.reply_code() {
        if let Err(e) = send_reply(stream, code, None).await {
            tracing::debug!("Failed to send {:?} reply: {}", code, e);
        }
    }
}
