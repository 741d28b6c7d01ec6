//! Wire values from RFC 1928 (SOCKS5) and RFC 1929 (username/password)

/// VER byte of every SOCKS5 frame
pub const SOCKS5_VERSION: u8 = 0x05;

/// VER byte of the RFC 1929 sub-negotiation
pub const SOCKS5_AUTH_VERSION: u8 = 0x01;

/// METHOD: no authentication
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// METHOD: GSSAPI, never selected by this server
pub const SOCKS5_AUTH_METHOD_GSSAPI: u8 = 0x01;
/// METHOD: username/password
pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
/// METHOD reply when none of the offered methods is acceptable
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

/// RFC 1929 STATUS: accepted
pub const SOCKS5_AUTH_SUCCESS: u8 = 0x00;
/// RFC 1929 STATUS: rejected (any non-zero value)
pub const SOCKS5_AUTH_FAILURE: u8 = 0x01;

/// CMD: CONNECT
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// CMD: BIND
pub const SOCKS5_CMD_TCP_BIND: u8 = 0x02;
/// CMD: UDP ASSOCIATE
pub const SOCKS5_CMD_UDP_ASSOCIATE: u8 = 0x03;

/// ATYP: four-octet IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// ATYP: one length octet followed by the name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// ATYP: sixteen-octet IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

/// RSV byte in requests and replies
pub const SOCKS5_RESERVED: u8 = 0x00;

/// Longest name a domain address can carry
pub const MAX_DOMAIN_LEN: usize = u8::MAX as usize;
/// Read size for each relay direction
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
