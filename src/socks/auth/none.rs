//! Method 0x00: the client is let through without credentials

use super::{AuthContext, AuthMethod};
use crate::error::Socks5Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Anonymous access
///
/// The method has no sub-negotiation; the client may send its request
/// right after the method selection reply.
pub struct NoAuth;

impl NoAuth {
    /// Produce an anonymous [`AuthContext`] without touching the stream
    pub async fn authenticate<S>(_stream: &mut S) -> Result<AuthContext, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        Ok(AuthContext {
            method: AuthMethod::None,
            username: None,
        })
    }
}
