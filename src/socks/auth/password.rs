//! RFC 1929 username/password sub-negotiation

use super::{AuthContext, AuthMethod, CredentialStore};
use crate::error::Socks5Error;
use crate::socks::consts::{SOCKS5_AUTH_FAILURE, SOCKS5_AUTH_SUCCESS, SOCKS5_AUTH_VERSION};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Method 0x02, checked against a [`CredentialStore`]
pub struct PasswordAuth;

impl PasswordAuth {
    /// Read the client's credentials and answer with a status frame
    ///
    /// Client sends:
    /// ```text
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
    /// +----+------+----------+------+----------+
    /// ```
    ///
    /// Server responds:
    /// ```text
    /// +----+--------+
    /// |VER | STATUS |
    /// +----+--------+
    /// | 1  |   1    |
    /// +----+--------+
    /// ```
    pub async fn authenticate<S>(
        stream: &mut S,
        store: &dyn CredentialStore,
    ) -> Result<AuthContext, Socks5Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let version = stream
            .read_u8()
            .await
            .map_err(|e| Socks5Error::from_read(e, "auth version"))?;

        if version != SOCKS5_AUTH_VERSION {
            send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
            return Err(Socks5Error::MalformedFrame(format!(
                "invalid auth version: {}",
                version
            )));
        }

        let username = read_field(stream, "username").await?;
        let password = read_field(stream, "password").await?;

        if store.valid(&username, &password) {
            send_auth_result(stream, SOCKS5_AUTH_SUCCESS).await?;
            tracing::debug!("User {} authenticated", username);
            Ok(AuthContext {
                method: AuthMethod::Password,
                username: Some(username),
            })
        } else {
            send_auth_result(stream, SOCKS5_AUTH_FAILURE).await?;
            tracing::warn!("Rejected credentials for user {}", username);
            Err(Socks5Error::AuthFailed)
        }
    }
}

/// Read one `LEN BYTES` field as UTF-8
async fn read_field<S>(stream: &mut S, what: &str) -> Result<String, Socks5Error>
where
    S: AsyncRead + Unpin,
{
    let len = stream
        .read_u8()
        .await
        .map_err(|e| Socks5Error::from_read(e, what))? as usize;

    let mut buf = vec![0u8; len];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(|e| Socks5Error::from_read(e, what))?;

    String::from_utf8(buf)
        .map_err(|_| Socks5Error::MalformedFrame(format!("invalid UTF-8 in {}", what)))
}

/// Write the `VER STATUS` answer
async fn send_auth_result<S>(stream: &mut S, status: u8) -> Result<(), Socks5Error>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&[SOCKS5_AUTH_VERSION, status]).await?;
    stream.flush().await?;
    Ok(())
}
