//! Address rewriting hooks
//!
//! An [`AddressRewriter`] can redirect the outbound destination after
//! resolution, and can replace the bound address reported to the client,
//! e.g. to advertise a public address when the server runs behind NAT.

use crate::socks::types::{Request, RequestContext};
use std::fmt::Debug;
use std::net::{IpAddr, SocketAddr};

/// Rewrites destination and bound addresses
///
/// Both methods default to the identity.
pub trait AddressRewriter: Send + Sync + Debug {
    /// Address actually dialed for a CONNECT request
    fn rewrite_destination(
        &self,
        _ctx: &RequestContext,
        _request: &Request,
        dest: SocketAddr,
    ) -> SocketAddr {
        dest
    }

    /// Address reported in the reply's BND.ADDR / BND.PORT
    fn rewrite_bound(
        &self,
        _ctx: &RequestContext,
        _request: &Request,
        bound: SocketAddr,
    ) -> SocketAddr {
        bound
    }
}

/// Reports a fixed public IP as the bound address, keeping the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisedAddress(pub IpAddr);

impl AddressRewriter for AdvertisedAddress {
    fn rewrite_bound(
        &self,
        _ctx: &RequestContext,
        _request: &Request,
        bound: SocketAddr,
    ) -> SocketAddr {
        SocketAddr::new(self.0, bound.port())
    }
}
