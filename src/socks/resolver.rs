//! Name resolution for domain-name destinations

use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::IpAddr;

/// Resolves a domain name to an IP address
///
/// Called once per request whose destination is a domain name, before the
/// rule engine runs and before any outbound connection is attempted.
#[async_trait]
pub trait NameResolver: Send + Sync + Debug {
    /// Resolve `name` to a single address
    async fn resolve(&self, name: &str) -> io::Result<IpAddr>;
}

/// Resolver backed by the system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl NameResolver for DnsResolver {
    async fn resolve(&self, name: &str) -> io::Result<IpAddr> {
        tokio::net::lookup_host((name, 0))
            .await?
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no addresses found for {}", name),
                )
            })
    }
}
