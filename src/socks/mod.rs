//! SOCKS5 protocol implementation
//!
//! This module implements the server side of SOCKS5 (RFC 1928) with
//! username/password authentication (RFC 1929). Name resolution, access
//! rules, address rewriting and outbound dialing are pluggable through
//! [`Socks5Config`].

mod auth;
mod command;
mod consts;
mod dialer;
mod handler;
mod options;
mod resolver;
mod rewriter;
mod rules;
mod tcp_relay;
mod types;

pub use auth::{authenticate, AuthContext, AuthMethod, CredentialStore, StaticCredentials};
pub use command::{encode_reply, parse_address, parse_request, send_reply};
pub use consts::*;
pub use dialer::{Dialer, SocketOpts, TcpDialer};
pub use handler::{handle_request, handle_socks5_on_stream, ConnectionInfo};
pub use options::Socks5Config;
pub use resolver::{DnsResolver, NameResolver};
pub use rewriter::{AddressRewriter, AdvertisedAddress};
pub use rules::{PermitAll, PermitCommand, PermitNone, RuleEngine};
pub use tcp_relay::{handle_tcp_connect, relay_tcp, RelayStats};
pub use types::{AddressType, Request, RequestContext, SocksCommand, TargetAddr};
