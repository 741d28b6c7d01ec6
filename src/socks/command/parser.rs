//! SOCKS5 request parser
//!
//! Decodes request frames and address specs from the client stream.

use crate::error::Socks5Error;
use crate::socks::consts::*;
use crate::socks::types::{AddressType, Request, SocksCommand, TargetAddr};
use std::net::{Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Parse a SOCKS5 request from the stream
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// An unknown command byte is not an error here: the frame is still read in
/// full and the command is surfaced as [`SocksCommand::Unknown`], so the
/// handler can answer with a proper reply.
pub async fn parse_request<S>(stream: &mut S) -> Result<Request, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    // Read: VER CMD RSV
    let mut header = [0u8; 3];
    stream
        .read_exact(&mut header)
        .await
        .map_err(|e| Socks5Error::from_read(e, "request header"))?;

    let version = header[0];
    let cmd_byte = header[1];
    let _reserved = header[2];

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let command = SocksCommand::from_byte(cmd_byte);
    let dest_addr = parse_address(stream).await?;

    tracing::debug!("Parsed SOCKS5 command: {} to {}", command, dest_addr);

    Ok(Request::new(command, dest_addr))
}

/// Parse an address field: `ATYP ADDR PORT`
///
/// Used for request destinations and, symmetrically, for reply bound
/// addresses.
pub async fn parse_address<S>(stream: &mut S) -> Result<TargetAddr, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let atyp = stream
        .read_u8()
        .await
        .map_err(|e| Socks5Error::from_read(e, "address type"))?;

    let addr_type =
        AddressType::from_byte(atyp).ok_or(Socks5Error::AddressTypeNotSupported(atyp))?;

    match addr_type {
        AddressType::Ipv4 => {
            let mut addr = [0u8; 4];
            stream
                .read_exact(&mut addr)
                .await
                .map_err(|e| Socks5Error::from_read(e, "IPv4 address"))?;
            let port = read_port(stream).await?;

            Ok(TargetAddr::ipv4(Ipv4Addr::from(addr), port))
        }

        AddressType::Domain => {
            let domain_len = stream
                .read_u8()
                .await
                .map_err(|e| Socks5Error::from_read(e, "domain length"))? as usize;

            if domain_len == 0 {
                return Err(Socks5Error::MalformedFrame("empty domain name".to_string()));
            }

            let mut domain_buf = vec![0u8; domain_len];
            stream
                .read_exact(&mut domain_buf)
                .await
                .map_err(|e| Socks5Error::from_read(e, "domain name"))?;
            let domain = String::from_utf8(domain_buf).map_err(|_| {
                Socks5Error::MalformedFrame("invalid UTF-8 in domain name".to_string())
            })?;
            let port = read_port(stream).await?;

            Ok(TargetAddr::Domain(domain, port))
        }

        AddressType::Ipv6 => {
            let mut addr = [0u8; 16];
            stream
                .read_exact(&mut addr)
                .await
                .map_err(|e| Socks5Error::from_read(e, "IPv6 address"))?;
            let port = read_port(stream).await?;

            Ok(TargetAddr::ipv6(Ipv6Addr::from(addr), port))
        }
    }
}

async fn read_port<S>(stream: &mut S) -> Result<u16, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    stream
        .read_u16()
        .await
        .map_err(|e| Socks5Error::from_read(e, "port"))
}
