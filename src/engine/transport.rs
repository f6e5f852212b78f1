// ABOUTME: Process-wide transport pool shared by every per-host engine client.
// ABOUTME: One bollard transport per route, bounded total and per-route connections.

use crate::config::{MAX_CONNECTIONS, PoolConfig};
use crate::error::{GatewayError, Result};
use bollard::Docker;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared connection pool for all engine hosts.
///
/// Build one at startup and hand it to the gateway as an `Arc`. It lives
/// as long as the process; nothing closes it.
///
/// Each route (rendered endpoint URL) gets its own bollard transport, whose
/// HTTP connections are reused by every client for that host. Every remote
/// call holds one total permit and one route permit while in flight.
pub struct TransportPool {
    config: PoolConfig,
    total: Arc<Semaphore>,
    routes: Mutex<HashMap<String, Route>>,
}

/// Transport and permit budget for one endpoint.
#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) docker: Docker,
    permits: Arc<Semaphore>,
}

/// Permits held for the duration of one remote call.
pub(crate) struct Lease {
    _route: OwnedSemaphorePermit,
    _total: OwnedSemaphorePermit,
}

impl TransportPool {
    /// Limits above [`MAX_CONNECTIONS`] are capped; loaded configs reject them.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            total: Arc::new(Semaphore::new(
                config.max_total_connections.min(MAX_CONNECTIONS),
            )),
            config,
            routes: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of endpoints the pool has opened a transport for.
    pub fn route_count(&self) -> usize {
        self.routes.lock().len()
    }

    /// Connections currently free across all routes.
    pub fn available(&self) -> usize {
        self.total.available_permits()
    }

    pub(crate) fn route(&self, endpoint: &str) -> Result<Route> {
        let mut routes = self.routes.lock();
        if let Some(route) = routes.get(endpoint) {
            return Ok(route.clone());
        }

        // Only bounds the wait for response headers; clients bound the body.
        let timeout = self.config.request_timeout();
        let docker = Docker::connect_with_http(
            endpoint,
            timeout.as_secs().max(1),
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| GatewayError::Connection(format!("{}: {}", endpoint, e)))?
        .with_timeout(timeout);

        tracing::debug!(endpoint, "opened engine transport");

        let route = Route {
            docker,
            permits: Arc::new(Semaphore::new(
                self.config.max_per_route_connections.min(MAX_CONNECTIONS),
            )),
        };
        routes.insert(endpoint.to_string(), route.clone());
        Ok(route)
    }

    /// Wait for a route permit and a total permit, at most `connect_timeout`.
    pub(crate) async fn acquire(&self, route: &Route) -> Result<Lease> {
        let wait = async {
            let route = route.permits.clone().acquire_owned().await?;
            let total = self.total.clone().acquire_owned().await?;
            Ok::<_, tokio::sync::AcquireError>(Lease {
                _route: route,
                _total: total,
            })
        };

        match tokio::time::timeout(self.config.connect_timeout, wait).await {
            Ok(Ok(lease)) => Ok(lease),
            Ok(Err(_)) => Err(GatewayError::Connection(
                "connection pool closed".to_string(),
            )),
            Err(_) => Err(GatewayError::Connection(format!(
                "connection pool exhausted after {:?}",
                self.config.connect_timeout
            ))),
        }
    }
}

impl Default for TransportPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl std::fmt::Debug for TransportPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportPool")
            .field("config", &self.config)
            .field("routes", &self.route_count())
            .field("available", &self.available())
            .finish()
    }
}
