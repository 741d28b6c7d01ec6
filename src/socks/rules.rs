//! Access control for SOCKS5 requests
//!
//! A [`RuleEngine`] sees every request after its destination has been
//! resolved and before any outbound connection is opened. Engines return
//! an updated [`RequestContext`] alongside the decision, so stateful or
//! chained engines can annotate the request for later stages.

use crate::socks::types::{Request, RequestContext, SocksCommand};
use async_trait::async_trait;
use std::fmt::Debug;

/// Decides whether a request is permitted
#[async_trait]
pub trait RuleEngine: Send + Sync + Debug {
    /// Returns the updated context and whether the request may proceed
    async fn allow(&self, ctx: RequestContext, request: &Request) -> (RequestContext, bool);
}

/// Permits every request
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

#[async_trait]
impl RuleEngine for PermitAll {
    async fn allow(&self, ctx: RequestContext, _request: &Request) -> (RequestContext, bool) {
        (ctx, true)
    }
}

/// Denies every request
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitNone;

#[async_trait]
impl RuleEngine for PermitNone {
    async fn allow(&self, ctx: RequestContext, _request: &Request) -> (RequestContext, bool) {
        (ctx, false)
    }
}

/// Permits requests by command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitCommand {
    /// Allow CONNECT
    pub enable_connect: bool,
    /// Allow BIND
    pub enable_bind: bool,
    /// Allow UDP ASSOCIATE
    pub enable_associate: bool,
}

impl Default for PermitCommand {
    fn default() -> Self {
        PermitCommand {
            enable_connect: true,
            enable_bind: true,
            enable_associate: true,
        }
    }
}

#[async_trait]
impl RuleEngine for PermitCommand {
    async fn allow(&self, ctx: RequestContext, request: &Request) -> (RequestContext, bool) {
        let allowed = match request.command {
            SocksCommand::Connect => self.enable_connect,
            SocksCommand::Bind => self.enable_bind,
            SocksCommand::UdpAssociate => self.enable_associate,
            SocksCommand::Unknown(_) => false,
        };
        (ctx, allowed)
    }
}
