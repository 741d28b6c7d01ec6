//! SOCKS5 authentication module
//!
//! Handles authentication method negotiation and username/password
//! authentication.

mod credentials;
mod none;
mod password;

pub use credentials::{CredentialStore, StaticCredentials};
pub use none::NoAuth;
pub use password::PasswordAuth;

use super::consts::*;
use super::options::Socks5Config;
use crate::error::Socks5Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Authentication method types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// No authentication required
    #[default]
    None,
    /// Username/password authentication
    Password,
}

impl AuthMethod {
    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::None => SOCKS5_AUTH_METHOD_NONE,
            AuthMethod::Password => SOCKS5_AUTH_METHOD_PASSWORD,
        }
    }

    /// Parse from SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_AUTH_METHOD_NONE => Some(AuthMethod::None),
            SOCKS5_AUTH_METHOD_PASSWORD => Some(AuthMethod::Password),
            _ => None,
        }
    }
}

/// Outcome of a successful handshake, attached to every request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Method that was negotiated
    pub method: AuthMethod,
    /// Authenticated user, for username/password
    pub username: Option<String>,
}

/// Perform authentication negotiation and authentication
///
/// This function handles the complete SOCKS5 authentication flow:
/// 1. Read client's supported methods
/// 2. Select the first client method the server accepts
/// 3. Perform the method's sub-negotiation, if any
///
/// A wrong version byte fails with [`Socks5Error::UnsupportedVersion`]
/// without writing anything. When no method matches, `05 FF` is sent and
/// the call fails with [`Socks5Error::NoAcceptableMethod`].
pub async fn authenticate<S>(
    stream: &mut S,
    config: &Socks5Config,
) -> Result<AuthContext, Socks5Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Step 1: Read version and number of methods
    let mut buf = [0u8; 2];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(|e| Socks5Error::from_read(e, "method negotiation"))?;

    let version = buf[0];
    let num_methods = buf[1];

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    // Step 2: Read available methods
    let mut methods = vec![0u8; num_methods as usize];
    stream
        .read_exact(&mut methods)
        .await
        .map_err(|e| Socks5Error::from_read(e, "method list"))?;

    // Step 3: Select authentication method; Password needs a credential store
    let accepted: Vec<AuthMethod> = config
        .auth_methods()
        .iter()
        .copied()
        .filter(|m| *m != AuthMethod::Password || config.credentials().is_some())
        .collect();
    let selected_method = select_auth_method(&methods, &accepted);

    // Step 4: Send selected method
    stream
        .write_all(&[
            SOCKS5_VERSION,
            selected_method
                .map(|m| m.to_byte())
                .unwrap_or(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE),
        ])
        .await?;
    stream.flush().await?;

    let method = selected_method.ok_or(Socks5Error::NoAcceptableMethod)?;

    // Step 5: Perform authentication if required
    match method {
        AuthMethod::None => NoAuth::authenticate(stream).await,
        AuthMethod::Password => {
            let store = config.credentials().ok_or(Socks5Error::AuthFailed)?;
            PasswordAuth::authenticate(stream, store).await
        }
    }
}

/// Select the first client-offered method that the server accepts
fn select_auth_method(offered: &[u8], accepted: &[AuthMethod]) -> Option<AuthMethod> {
    offered
        .iter()
        .filter_map(|&byte| AuthMethod::from_byte(byte))
        .find(|method| accepted.contains(method))
}
