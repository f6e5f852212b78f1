// ABOUTME: Limits and timeouts for the shared engine transport pool.
// ABOUTME: Bounded total and per-route connections, fixed connect/read timeouts.

use serde::Deserialize;
use std::time::Duration;

/// Largest connection limit the pool can enforce.
pub const MAX_CONNECTIONS: usize = tokio::sync::Semaphore::MAX_PERMITS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_total")]
    pub max_total_connections: usize,

    #[serde(default = "default_max_per_route")]
    pub max_per_route_connections: usize,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub read_timeout: Duration,
}

fn default_max_total() -> usize {
    1000
}

fn default_max_per_route() -> usize {
    100
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl PoolConfig {
    /// Deadline for a single request: connecting plus waiting for the answer.
    pub fn request_timeout(&self) -> Duration {
        self.connect_timeout + self.read_timeout
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_total_connections: default_max_total(),
            max_per_route_connections: default_max_per_route(),
            connect_timeout: default_timeout(),
            read_timeout: default_timeout(),
        }
    }
}
