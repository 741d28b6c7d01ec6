//! Error types for Socksgate
//!
//! This module defines the SOCKS5 protocol error taxonomy and the
//! crate-level error used by the server and configuration layers.

use std::io;
use thiserror::Error;

/// Main error type for Socksgate operations
#[derive(Error, Debug)]
pub enum SocksgateError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),
}

/// SOCKS5 specific errors
///
/// Every variant is scoped to a single client connection. Use
/// [`Socks5Error::reply_code`] to find out which reply (if any) the client
/// should receive before the connection is closed.
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Client spoke something other than SOCKS5; no reply is meaningful
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Frame was truncated or carried invalid content
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Unknown ATYP tag in a request frame
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// No acceptable authentication method
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Authentication failed
    #[error("Authentication failed")]
    AuthFailed,

    /// Command byte not supported by this server
    #[error("Command not supported: {0}")]
    UnsupportedCommand(u8),

    /// Domain name could not be resolved
    #[error("Failed to resolve {name}: {source}")]
    ResolutionFailure {
        /// Domain that failed to resolve
        name: String,
        /// Underlying resolver error
        #[source]
        source: io::Error,
    },

    /// Request refused by the rule engine
    #[error("Connection not allowed by ruleset")]
    RuleDenied,

    /// Outbound connection to the destination failed
    #[error("Failed to connect to destination ({code:?}): {source}")]
    OutboundConnect {
        /// Reply code sent to the client
        code: ReplyCode,
        /// Underlying connect error
        #[source]
        source: io::Error,
    },

    /// IO error on the client connection
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Socks5Error {
    /// Reply code to attempt before closing, `None` when no reply should be sent
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            Socks5Error::UnsupportedVersion(_) => None,
            Socks5Error::MalformedFrame(_) => Some(ReplyCode::GeneralFailure),
            Socks5Error::AddressTypeNotSupported(_) => Some(ReplyCode::AddressTypeNotSupported),
            // Handshake failures have their own reply format
            Socks5Error::NoAcceptableMethod | Socks5Error::AuthFailed => None,
            Socks5Error::UnsupportedCommand(_) => Some(ReplyCode::CommandNotSupported),
            Socks5Error::ResolutionFailure { .. } => Some(ReplyCode::HostUnreachable),
            Socks5Error::RuleDenied => Some(ReplyCode::ConnectionNotAllowed),
            Socks5Error::OutboundConnect { code, .. } => Some(*code),
            Socks5Error::Io(_) => None,
        }
    }

    /// Map a read failure while decoding a frame
    ///
    /// A stream that ends in the middle of a frame is a malformed frame,
    /// everything else is a plain IO failure.
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Socks5Error::MalformedFrame(format!("stream ended while reading {}", what))
        } else {
            Socks5Error::Io(err)
        }
    }
}

/// Reply codes for SOCKS5 protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ReplyCode {
    type Error = Socks5Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ReplyCode::Succeeded),
            0x01 => Ok(ReplyCode::GeneralFailure),
            0x02 => Ok(ReplyCode::ConnectionNotAllowed),
            0x03 => Ok(ReplyCode::NetworkUnreachable),
            0x04 => Ok(ReplyCode::HostUnreachable),
            0x05 => Ok(ReplyCode::ConnectionRefused),
            0x06 => Ok(ReplyCode::TtlExpired),
            0x07 => Ok(ReplyCode::CommandNotSupported),
            0x08 => Ok(ReplyCode::AddressTypeNotSupported),
            _ => Err(Socks5Error::MalformedFrame(format!(
                "unknown reply code: {}",
                value
            ))),
        }
    }
}

/// Map an outbound connect error to the nearest reply code
///
/// Anything that is neither a refusal nor a network-level failure is
/// reported as an unreachable host, timeouts included.
impl From<&io::Error> for ReplyCode {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ReplyCode::ConnectionRefused,
            io::ErrorKind::NetworkUnreachable => ReplyCode::NetworkUnreachable,
            io::ErrorKind::PermissionDenied => ReplyCode::ConnectionNotAllowed,
            _ => ReplyCode::HostUnreachable,
        }
    }
}
