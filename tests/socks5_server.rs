//! End-to-end tests over loopback TCP

mod common;

use async_socks5::Auth;
use async_trait::async_trait;
use common::socks5_mock;
use common::{
    connect_no_auth, create_test_listener, read_ipv4_reply, spawn_echo_server, start_server,
    TestConfigBuilder,
};
use socksgate::socks::{
    NameResolver, PermitNone, Socks5Config, SOCKS5_CMD_TCP_BIND, SOCKS5_CMD_UDP_ASSOCIATE,
};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Resolves every name to the loopback address
#[derive(Debug)]
struct LoopbackResolver;

#[async_trait]
impl NameResolver for LoopbackResolver {
    async fn resolve(&self, _name: &str) -> io::Result<IpAddr> {
        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

#[tokio::test]
async fn test_connect_through_client_library() {
    let echo_addr = spawn_echo_server().await;
    let (proxy, _shutdown) = start_server(Socks5Config::default()).await;

    let mut stream = TcpStream::connect(proxy).await.unwrap();
    async_socks5::connect(&mut stream, echo_addr, None)
        .await
        .unwrap();

    stream.write_all(b"through the proxy").await.unwrap();
    let mut buf = [0u8; 17];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"through the proxy");
}

#[tokio::test]
async fn test_worked_example_ping_pong() {
    let (listener, dest) = create_test_listener().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4];
        socket.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
        socket.write_all(b"pong").await.unwrap();
    });

    let (proxy, _shutdown) = start_server(Socks5Config::default()).await;
    let mut stream = connect_no_auth(proxy).await;

    let mut request = socks5_mock::create_connect_ipv4([127, 0, 0, 1], dest.port());
    request.extend_from_slice(b"ping");
    stream.write_all(&request).await.unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    // BND.PORT is the local port of the outbound socket, not the
    // destination port, so only the status and address are compared
    assert_eq!(&reply[..8], &[5, 0, 0, 1, 127, 0, 0, 1]);

    let mut pong = [0u8; 4];
    stream.read_exact(&mut pong).await.unwrap();
    assert_eq!(&pong, b"pong");
}

#[tokio::test]
async fn test_response_after_client_half_close() {
    let (listener, dest) = create_test_listener().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        socket.read_to_end(&mut request).await.unwrap();
        assert_eq!(request, b"ping");
        tokio::time::sleep(Duration::from_millis(50)).await;
        socket.write_all(b"pong").await.unwrap();
    });

    let (proxy, _shutdown) = start_server(Socks5Config::default()).await;
    let mut stream = connect_no_auth(proxy).await;

    let mut request = socks5_mock::create_connect_ipv4([127, 0, 0, 1], dest.port());
    request.extend_from_slice(b"ping");
    stream.write_all(&request).await.unwrap();
    stream.shutdown().await.unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply[1], 0);

    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await.unwrap();
    assert_eq!(rest, b"pong");
}

#[tokio::test]
async fn test_password_auth() {
    let echo_addr = spawn_echo_server().await;
    let config = TestConfigBuilder::new()
        .auth_required(true)
        .user("alice", "secret")
        .build_socks5();
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = TcpStream::connect(proxy).await.unwrap();
    async_socks5::connect(&mut stream, echo_addr, Some(Auth::new("alice", "secret")))
        .await
        .unwrap();

    stream.write_all(b"hi").await.unwrap();
    let mut buf = [0u8; 2];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"hi");
}

#[tokio::test]
async fn test_password_auth_rejects_wrong_password() {
    let config = TestConfigBuilder::new()
        .auth_required(true)
        .user("alice", "secret")
        .build_socks5();
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = TcpStream::connect(proxy).await.unwrap();
    let result = async_socks5::connect(
        &mut stream,
        "127.0.0.1:9".parse::<SocketAddr>().unwrap(),
        Some(Auth::new("alice", "wrong")),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_password_auth_rejects_no_auth_client() {
    let config = TestConfigBuilder::new()
        .auth_required(true)
        .user("alice", "secret")
        .build_socks5();
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream
        .write_all(&socks5_mock::create_auth_request_no_auth())
        .await
        .unwrap();

    let mut method = [0u8; 2];
    stream.read_exact(&mut method).await.unwrap();
    assert_eq!(method, [5, 0xFF]);
}

#[tokio::test]
async fn test_domain_destination() {
    let echo_addr = spawn_echo_server().await;
    let config = Socks5Config::default().with_resolver(Arc::new(LoopbackResolver));
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = TcpStream::connect(proxy).await.unwrap();
    async_socks5::connect(
        &mut stream,
        ("echo.test".to_string(), echo_addr.port()),
        None,
    )
    .await
    .unwrap();

    stream.write_all(b"by name").await.unwrap();
    let mut buf = [0u8; 7];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"by name");
}

#[tokio::test]
async fn test_domain_destination_raw_frame() {
    let echo_addr = spawn_echo_server().await;
    let config = Socks5Config::default().with_resolver(Arc::new(LoopbackResolver));
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_connect_domain("echo.test", echo_addr.port()))
        .await
        .unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply[1], 0x00);
}

#[tokio::test]
async fn test_rule_denial() {
    let config = Socks5Config::default().with_rules(Arc::new(PermitNone));
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_connect_ipv4([127, 0, 0, 1], 9))
        .await
        .unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply, [5, 2, 0, 1, 0, 0, 0, 0, 0, 0]);

    // Connection is closed after the failure reply
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_connect_rule_from_config() {
    let config = TestConfigBuilder::new().connect_rule(false).build_socks5();
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_connect_ipv4([127, 0, 0, 1], 9))
        .await
        .unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply[1], 0x02);
}

#[tokio::test]
async fn test_connection_refused() {
    let (listener, dest) = create_test_listener().await;
    drop(listener);

    let (proxy, _shutdown) = start_server(Socks5Config::default()).await;
    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_connect_ipv4([127, 0, 0, 1], dest.port()))
        .await
        .unwrap();

    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply, [5, 5, 0, 1, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn test_destination_close_ends_tunnel() {
    let (listener, dest) = create_test_listener().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(b"bye").await.unwrap();
    });

    let (proxy, _shutdown) = start_server(Socks5Config::default()).await;
    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_connect_ipv4([127, 0, 0, 1], dest.port()))
        .await
        .unwrap();
    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply[1], 0x00);

    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut received))
        .await
        .expect("tunnel stayed open after destination closed")
        .unwrap();
    assert_eq!(received, b"bye");
}

#[tokio::test]
async fn test_bind_and_udp_associate_gated_by_config() {
    let (proxy, _shutdown) = start_server(TestConfigBuilder::new().build_socks5()).await;

    for command in [SOCKS5_CMD_TCP_BIND, SOCKS5_CMD_UDP_ASSOCIATE] {
        let mut stream = connect_no_auth(proxy).await;
        stream
            .write_all(&socks5_mock::create_request_ipv4(command, [0, 0, 0, 0], 0))
            .await
            .unwrap();
        let reply = read_ipv4_reply(&mut stream).await;
        assert_eq!(reply[1], 0x07);
    }
}

#[tokio::test]
async fn test_udp_associate_enabled() {
    let config = TestConfigBuilder::new()
        .allow_bind(true)
        .allow_udp(true)
        .build_socks5();
    let (proxy, _shutdown) = start_server(config).await;

    let mut stream = connect_no_auth(proxy).await;
    stream
        .write_all(&socks5_mock::create_request_ipv4(
            SOCKS5_CMD_UDP_ASSOCIATE,
            [0, 0, 0, 0],
            0,
        ))
        .await
        .unwrap();

    // Bound address is the server side of the control connection, port 0
    let reply = read_ipv4_reply(&mut stream).await;
    assert_eq!(reply, [5, 0, 0, 1, 127, 0, 0, 1, 0, 0]);
}

#[tokio::test]
async fn test_config_builder_round_trips_through_file_config() {
    let config = TestConfigBuilder::new()
        .auth_required(true)
        .user("bob", "hunter2")
        .allow_udp(true)
        .build();

    assert!(config.server.socks.validate().is_ok());
    assert_eq!(config.server.socks.users[0].username, "bob");
    assert!(config.server.socks.allow_udp);
}
