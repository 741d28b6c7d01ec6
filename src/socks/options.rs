//! Runtime configuration for the SOCKS5 protocol handler
//!
//! [`Socks5Config`] carries the negotiated-method set and the injected
//! capabilities (resolver, rule engine, rewriter, dialer). It is built once,
//! wrapped in an `Arc`, and shared read-only by every connection.

use super::auth::{AuthMethod, CredentialStore, StaticCredentials};
use super::dialer::{Dialer, SocketOpts, TcpDialer};
use super::resolver::{DnsResolver, NameResolver};
use super::rewriter::{AddressRewriter, AdvertisedAddress};
use super::rules::{PermitAll, PermitCommand, RuleEngine};
use crate::config::{SocksConfig, TcpConfig};
use crate::error::SocksgateError;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for the handshake and request phase
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for the outbound connection
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// SOCKS5 handler configuration
#[derive(Debug, Clone)]
pub struct Socks5Config {
    auth_methods: Vec<AuthMethod>,
    credentials: Option<Arc<dyn CredentialStore>>,
    rules: Arc<dyn RuleEngine>,
    resolver: Arc<dyn NameResolver>,
    rewriter: Option<Arc<dyn AddressRewriter>>,
    dialer: Arc<dyn Dialer>,
    bind_ip: Option<IpAddr>,
    allow_bind: bool,
    allow_udp: bool,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl Default for Socks5Config {
    fn default() -> Self {
        Socks5Config {
            auth_methods: vec![AuthMethod::None],
            credentials: None,
            rules: Arc::new(PermitAll),
            resolver: Arc::new(DnsResolver),
            rewriter: None,
            dialer: Arc::new(TcpDialer::default()),
            bind_ip: None,
            allow_bind: false,
            allow_udp: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Socks5Config {
    /// Build the runtime configuration from the file configuration
    pub fn from_socks_config(
        config: &SocksConfig,
        tcp: &TcpConfig,
    ) -> Result<Self, SocksgateError> {
        config.validate().map_err(SocksgateError::Config)?;

        let mut dialer = TcpDialer::new(SocketOpts::from_tcp_config(tcp));
        if let Some(ip) = config.outbound_ip {
            dialer = dialer.with_local_ip(ip);
        }

        let mut socks5 = Socks5Config::default()
            .with_rules(Arc::new(PermitCommand {
                enable_connect: config.rules.connect,
                enable_bind: config.rules.bind,
                enable_associate: config.rules.associate,
            }))
            .with_dialer(Arc::new(dialer))
            .with_bind(config.allow_bind)
            .with_udp(config.allow_udp)
            .with_request_timeout(Duration::from_secs(config.request_timeout))
            .with_connect_timeout(Duration::from_secs(config.connect_timeout));

        if config.has_credentials() {
            let creds: StaticCredentials = config
                .users
                .iter()
                .map(|u| (u.username.clone(), u.password.clone()))
                .collect();
            socks5 = socks5.with_credentials(Arc::new(creds));

            if !config.auth_required {
                socks5 = socks5.with_auth_methods(vec![AuthMethod::None, AuthMethod::Password]);
            }
        }

        if let Some(ip) = config.bind_ip {
            socks5 = socks5.with_bind_ip(ip);
        }

        if let Some(ip) = config.advertised_ip {
            socks5 = socks5.with_rewriter(Arc::new(AdvertisedAddress(ip)));
        }

        Ok(socks5)
    }

    /// Set the credential store and require username/password
    pub fn with_credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self.auth_methods = vec![AuthMethod::Password];
        self
    }

    /// Set the accepted authentication methods
    pub fn with_auth_methods(mut self, methods: Vec<AuthMethod>) -> Self {
        self.auth_methods = methods;
        self
    }

    /// Set the rule engine
    pub fn with_rules(mut self, rules: Arc<dyn RuleEngine>) -> Self {
        self.rules = rules;
        self
    }

    /// Set the name resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the address rewriter
    pub fn with_rewriter(mut self, rewriter: Arc<dyn AddressRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Set the outbound dialer
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    /// Set the address reported in BIND / UDP ASSOCIATE replies
    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = Some(ip);
        self
    }

    /// Accept or refuse BIND
    pub fn with_bind(mut self, allow: bool) -> Self {
        self.allow_bind = allow;
        self
    }

    /// Accept or refuse UDP ASSOCIATE
    pub fn with_udp(mut self, allow: bool) -> Self {
        self.allow_udp = allow;
        self
    }

    /// Set the handshake and request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the outbound connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Accepted authentication methods
    pub fn auth_methods(&self) -> &[AuthMethod] {
        &self.auth_methods
    }

    /// Credential store for username/password
    pub fn credentials(&self) -> Option<&dyn CredentialStore> {
        self.credentials.as_deref()
    }

    /// Rule engine
    pub fn rules(&self) -> &dyn RuleEngine {
        self.rules.as_ref()
    }

    /// Name resolver
    pub fn resolver(&self) -> &dyn NameResolver {
        self.resolver.as_ref()
    }

    /// Address rewriter, if any
    pub fn rewriter(&self) -> Option<&dyn AddressRewriter> {
        self.rewriter.as_deref()
    }

    /// Outbound dialer
    pub fn dialer(&self) -> &dyn Dialer {
        self.dialer.as_ref()
    }

    /// Bind-IP override
    pub fn bind_ip(&self) -> Option<IpAddr> {
        self.bind_ip
    }

    /// Whether BIND is accepted
    pub fn allow_bind(&self) -> bool {
        self.allow_bind
    }

    /// Whether UDP ASSOCIATE is accepted
    pub fn allow_udp(&self) -> bool {
        self.allow_udp
    }

    /// Handshake and request timeout
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Outbound connect timeout
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
