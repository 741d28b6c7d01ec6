//! Test utilities and mocks for Socksgate
//!
//! This module provides common test utilities used across integration tests.

use socksgate::socks::Socks5Config;
use socksgate::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Start an echo server that serves one connection
pub async fn spawn_echo_server() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if socket.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    addr
}

/// Start a SOCKS5 server on an available port
///
/// The server stops when the returned sender is dropped or signalled.
pub async fn start_server(config: Socks5Config) -> (SocketAddr, broadcast::Sender<bool>) {
    let (listener, addr) = create_test_listener().await;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let server = Server::new(Arc::new(config));
    tokio::spawn(async move { server.serve(listener, shutdown_rx).await });

    (addr, shutdown_tx)
}

/// Connect to `proxy` and complete the no-auth handshake
pub async fn connect_no_auth(proxy: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream
        .write_all(&socks5_mock::create_auth_request_no_auth())
        .await
        .unwrap();

    let mut method = [0u8; 2];
    stream.read_exact(&mut method).await.unwrap();
    assert_eq!(method, [5, 0]);

    stream
}

/// Read a reply carrying an IPv4 bound address
pub async fn read_ipv4_reply(stream: &mut TcpStream) -> [u8; 10] {
    let mut reply = [0u8; 10];
    stream.read_exact(&mut reply).await.unwrap();
    reply
}

/// Test configuration builder
pub struct TestConfigBuilder {
    listen_addr: String,
    auth_required: bool,
    users: Vec<(String, String)>,
    allow_bind: bool,
    allow_udp: bool,
    connect_rule: bool,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            listen_addr: "127.0.0.1:0".to_string(),
            auth_required: false,
            users: Vec::new(),
            allow_bind: false,
            allow_udp: false,
            connect_rule: true,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Require username/password authentication
    pub fn auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }

    /// Add a user
    pub fn user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    /// Allow BIND
    pub fn allow_bind(mut self, allow: bool) -> Self {
        self.allow_bind = allow;
        self
    }

    /// Allow UDP ASSOCIATE
    pub fn allow_udp(mut self, allow: bool) -> Self {
        self.allow_udp = allow;
        self
    }

    /// Permit or deny CONNECT in the rules section
    pub fn connect_rule(mut self, permit: bool) -> Self {
        self.connect_rule = permit;
        self
    }

    /// Build the file configuration
    pub fn build(self) -> socksgate::config::Config {
        socksgate::config::Config {
            server: socksgate::config::ServerConfig {
                listen_addr: self.listen_addr,
                tcp: socksgate::config::TcpConfig::default(),
                socks: socksgate::config::SocksConfig {
                    auth_required: self.auth_required,
                    users: self
                        .users
                        .into_iter()
                        .map(|(username, password)| socksgate::config::UserConfig {
                            username,
                            password,
                        })
                        .collect(),
                    allow_bind: self.allow_bind,
                    allow_udp: self.allow_udp,
                    rules: socksgate::config::RulesConfig {
                        connect: self.connect_rule,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            },
        }
    }

    /// Build the runtime SOCKS5 configuration
    pub fn build_socks5(self) -> Socks5Config {
        let config = self.build();
        Socks5Config::from_socks_config(&config.server.socks, &config.server.tcp).unwrap()
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use socksgate::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a command request to an IPv4 address
    pub fn create_request_ipv4(command: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![SOCKS5_VERSION, command, SOCKS5_RESERVED, SOCKS5_ADDR_TYPE_IPV4];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        create_request_ipv4(SOCKS5_CMD_TCP_CONNECT, ip, port)
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
