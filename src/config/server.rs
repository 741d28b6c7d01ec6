//! Server configuration types
//!
//! Defines the main configuration structures for the Socksgate server.

use super::TcpConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;

/// Default listen address
fn default_listen_addr() -> String {
    "127.0.0.1:1080".to_string()
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
}

/// Listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address to accept SOCKS5 clients on (e.g., "0.0.0.0:1080")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Socket options for outbound connections
    #[serde(default)]
    pub tcp: TcpConfig,

    /// SOCKS5 protocol configuration
    #[serde(default)]
    pub socks: SocksConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            tcp: TcpConfig::default(),
            socks: SocksConfig::default(),
        }
    }
}

/// Default request timeout in seconds
fn default_request_timeout() -> u64 {
    10
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// A username/password pair
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserConfig {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

fn default_true() -> bool {
    true
}

/// Per-command access rules
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RulesConfig {
    /// Permit CONNECT
    #[serde(default = "default_true")]
    pub connect: bool,

    /// Permit BIND
    #[serde(default = "default_true")]
    pub bind: bool,

    /// Permit UDP ASSOCIATE
    #[serde(default = "default_true")]
    pub associate: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            connect: true,
            bind: true,
            associate: true,
        }
    }
}

/// SOCKS5 server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SocksConfig {
    /// Require username/password authentication
    #[serde(default)]
    pub auth_required: bool,

    /// Accepted users
    #[serde(default)]
    pub users: Vec<UserConfig>,

    /// Accept the BIND command
    #[serde(default)]
    pub allow_bind: bool,

    /// Accept the UDP ASSOCIATE command
    #[serde(default)]
    pub allow_udp: bool,

    /// Address reported in BIND / UDP ASSOCIATE replies
    #[serde(default)]
    pub bind_ip: Option<IpAddr>,

    /// Public address reported in CONNECT replies, when behind NAT
    #[serde(default)]
    pub advertised_ip: Option<IpAddr>,

    /// Local address outbound connections are made from
    #[serde(default)]
    pub outbound_ip: Option<IpAddr>,

    /// Handshake and request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Outbound connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Access rules
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for SocksConfig {
    fn default() -> Self {
        Self {
            auth_required: false,
            users: Vec::new(),
            allow_bind: false,
            allow_udp: false,
            bind_ip: None,
            advertised_ip: None,
            outbound_ip: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            rules: RulesConfig::default(),
        }
    }
}

impl SocksConfig {
    /// Check if authentication credentials are configured
    pub fn has_credentials(&self) -> bool {
        !self.users.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_required && !self.has_credentials() {
            return Err("Authentication required but no credentials configured".to_string());
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.is_empty() {
                return Err("Username must not be empty".to_string());
            }
            if !seen.insert(user.username.as_str()) {
                return Err(format!("Duplicate username: {}", user.username));
            }
        }

        if self.request_timeout == 0 || self.connect_timeout == 0 {
            return Err("Timeouts must be greater than zero".to_string());
        }

        Ok(())
    }
}
