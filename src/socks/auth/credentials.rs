//! Credential storage for username/password authentication

use std::collections::HashMap;
use std::fmt::Debug;

/// Validates username/password pairs
///
/// Implementations are shared by every connection and must be safe for
/// concurrent use.
pub trait CredentialStore: Send + Sync + Debug {
    /// Returns `true` when the pair is valid
    fn valid(&self, username: &str, password: &str) -> bool;
}

/// In-memory credential store
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user
    pub fn insert(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    /// Number of configured users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are configured
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<U, P> FromIterator<(U, P)> for StaticCredentials
where
    U: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (U, P)>>(iter: I) -> Self {
        let mut creds = StaticCredentials::new();
        for (username, password) in iter {
            creds.insert(username, password);
        }
        creds
    }
}

impl CredentialStore for StaticCredentials {
    fn valid(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|expected| expected == password)
            .unwrap_or(false)
    }
}
