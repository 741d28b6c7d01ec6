//! Outbound socket tuning

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[server.tcp]` table
///
/// Applied to every socket the proxy opens towards a destination. A
/// `keepalive_secs` of zero turns keepalive off.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TcpConfig {
    /// Set TCP_NODELAY on outbound sockets
    pub nodelay: bool,

    /// Idle time before the first keepalive probe, in seconds
    pub keepalive_secs: u64,

    /// Time between keepalive probes, in seconds
    pub keepalive_interval: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: true,
            keepalive_secs: 20,
            keepalive_interval: 8,
        }
    }
}

impl TcpConfig {
    /// Keepalive idle time and probe interval, `None` when disabled
    pub fn keepalive(&self) -> Option<(Duration, Duration)> {
        if self.keepalive_secs == 0 {
            return None;
        }
        Some((
            Duration::from_secs(self.keepalive_secs),
            Duration::from_secs(self.keepalive_interval.max(1)),
        ))
    }
}
