//! SOCKS5 type definitions
//!
//! Defines the core types used in SOCKS5 protocol handling: commands,
//! destination addresses, and the per-connection request.

use super::auth::AuthContext;
use super::consts::*;
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - wait for incoming connection
    Bind,
    /// UDP ASSOCIATE - establish UDP relay
    UdpAssociate,
    /// Command byte this server does not know
    Unknown(u8),
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => SocksCommand::Connect,
            SOCKS5_CMD_TCP_BIND => SocksCommand::Bind,
            SOCKS5_CMD_UDP_ASSOCIATE => SocksCommand::UdpAssociate,
            other => SocksCommand::Unknown(other),
        }
    }

    /// Convert SocksCommand to byte
    pub fn to_byte(self) -> u8 {
        match self {
            SocksCommand::Connect => SOCKS5_CMD_TCP_CONNECT,
            SocksCommand::Bind => SOCKS5_CMD_TCP_BIND,
            SocksCommand::UdpAssociate => SOCKS5_CMD_UDP_ASSOCIATE,
            SocksCommand::Unknown(byte) => byte,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
            SocksCommand::Unknown(byte) => write!(f, "UNKNOWN({:#04x})", byte),
        }
    }
}

/// Wire address type (ATYP)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// 4-byte IPv4 address
    Ipv4,
    /// Length-prefixed domain name
    Domain,
    /// 16-byte IPv6 address
    Ipv6,
}

impl AddressType {
    /// Parse an ATYP byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_ADDR_TYPE_IPV4 => Some(AddressType::Ipv4),
            SOCKS5_ADDR_TYPE_DOMAIN => Some(AddressType::Domain),
            SOCKS5_ADDR_TYPE_IPV6 => Some(AddressType::Ipv6),
            _ => None,
        }
    }

    /// Convert to ATYP byte
    pub fn to_byte(self) -> u8 {
        match self {
            AddressType::Ipv4 => SOCKS5_ADDR_TYPE_IPV4,
            AddressType::Domain => SOCKS5_ADDR_TYPE_DOMAIN,
            AddressType::Ipv6 => SOCKS5_ADDR_TYPE_IPV6,
        }
    }
}

/// Target address for SOCKS5 requests
///
/// Represents the destination address in a SOCKS5 request, or the bound
/// address in a reply. Can be an IP address (v4 or v6) or a domain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name with port
    Domain(String, u16),
}

impl TargetAddr {
    /// Create a new TargetAddr from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new TargetAddr from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new TargetAddr from a domain name and port
    pub fn domain(domain: impl Into<String>, port: u16) -> Self {
        TargetAddr::Domain(domain.into(), port)
    }

    /// Unspecified IPv4 address with port 0, used in failure replies
    pub fn unspecified() -> Self {
        TargetAddr::ipv4(Ipv4Addr::UNSPECIFIED, 0)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            TargetAddr::Ip(addr) => addr.port(),
            TargetAddr::Domain(_, port) => *port,
        }
    }

    /// Get the wire address type
    pub fn addr_type(&self) -> AddressType {
        match self {
            TargetAddr::Ip(SocketAddr::V4(_)) => AddressType::Ipv4,
            TargetAddr::Ip(SocketAddr::V6(_)) => AddressType::Ipv6,
            TargetAddr::Domain(_, _) => AddressType::Domain,
        }
    }

    /// Domain name, if this is a domain address
    pub fn domain_name(&self) -> Option<&str> {
        match self {
            TargetAddr::Domain(domain, _) => Some(domain),
            TargetAddr::Ip(_) => None,
        }
    }

    /// Serialize the address to bytes for SOCKS5 protocol
    ///
    /// Produces `ATYP ADDR PORT`. Domain names longer than 255 bytes are
    /// truncated to fit the one-byte length prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(self.addr_type().to_byte());

        match self {
            TargetAddr::Ip(SocketAddr::V4(addr)) => {
                bytes.extend_from_slice(&addr.ip().octets());
                bytes.extend_from_slice(&addr.port().to_be_bytes());
            }
            TargetAddr::Ip(SocketAddr::V6(addr)) => {
                bytes.extend_from_slice(&addr.ip().octets());
                bytes.extend_from_slice(&addr.port().to_be_bytes());
            }
            TargetAddr::Domain(domain, port) => {
                let name = &domain.as_bytes()[..domain.len().min(MAX_DOMAIN_LEN)];
                bytes.push(name.len() as u8);
                bytes.extend_from_slice(name);
                bytes.extend_from_slice(&port.to_be_bytes());
            }
        }

        bytes
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddr::Ip(addr) => write!(f, "{}", addr),
            TargetAddr::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddr> for TargetAddr {
    fn from(addr: SocketAddr) -> Self {
        TargetAddr::Ip(addr)
    }
}

impl Default for TargetAddr {
    fn default() -> Self {
        TargetAddr::unspecified()
    }
}

/// A parsed SOCKS5 request
///
/// Lives for one connection attempt. The destination is the address the
/// client asked for; the resolved socket address is tracked separately by
/// the handler.
#[derive(Debug, Clone)]
pub struct Request {
    /// Protocol version, always 5 for a decoded request
    pub version: u8,
    /// Requested command
    pub command: SocksCommand,
    /// Destination requested by the client
    pub dest_addr: TargetAddr,
    /// Result of the authentication handshake
    pub auth: AuthContext,
    /// Address of the client, when known
    pub remote_addr: Option<SocketAddr>,
}

impl Request {
    /// Create a request for a command and destination
    pub fn new(command: SocksCommand, dest_addr: TargetAddr) -> Self {
        Request {
            version: SOCKS5_VERSION,
            command,
            dest_addr,
            auth: AuthContext::default(),
            remote_addr: None,
        }
    }
}

/// Context threaded through the rule engine and address rewriter
///
/// Rule engines return an updated context, so chained or stateful engines
/// can leave annotations for later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    values: HashMap<String, String>,
}

impl RequestContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a value, returning the updated context
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}
