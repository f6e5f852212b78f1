// ABOUTME: Host-parameterized facade over the engine client.
// ABOUTME: Builds a fresh client per call on top of the shared transport pool.

use super::client::EngineClient;
use super::traits::{ContainerInfo, ContainerOps, EngineInfo, EngineInfoOps, ImageOps};
use super::transport::TransportPool;
use crate::config::{EndpointTemplate, GatewayConfig};
use crate::error::Result;
use crate::types::{ContainerId, ImageId, ImageRef, RedisContainerSpec};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entry point for lifecycle operations against engine hosts.
///
/// Every method takes the host address first, renders its endpoint, and
/// talks to it through a client built for that one call. Clients are never
/// cached; only the pool's transports are reused. Errors come back exactly
/// as the client produced them.
#[derive(Debug, Clone)]
pub struct EngineGateway {
    endpoint: EndpointTemplate,
    pool: Arc<TransportPool>,
}

impl EngineGateway {
    pub fn new(endpoint: EndpointTemplate, pool: Arc<TransportPool>) -> Self {
        Self { endpoint, pool }
    }

    /// Gateway with its own pool built from `config`.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            Arc::new(TransportPool::new(config.pool.clone())),
        )
    }

    pub fn endpoint(&self) -> &EndpointTemplate {
        &self.endpoint
    }

    pub fn pool(&self) -> &Arc<TransportPool> {
        &self.pool
    }

    /// A new client for `host`.
    pub fn client(&self, host: &str) -> Result<EngineClient> {
        EngineClient::connect(Arc::clone(&self.pool), &self.endpoint, host)
    }

    pub async fn info(&self, host: &str) -> Result<EngineInfo> {
        self.client(host)?.info().await
    }

    pub async fn ping(&self, host: &str) -> Result<()> {
        self.client(host)?.ping().await
    }

    pub async fn search_images(&self, host: &str, repository: &str) -> Result<Vec<String>> {
        self.client(host)?.search_images(repository).await
    }

    pub async fn list_images(
        &self,
        host: &str,
        filter: Option<&str>,
    ) -> Result<BTreeMap<String, ImageId>> {
        self.client(host)?.list_images(filter).await
    }

    pub async fn image_exists(&self, host: &str, reference: &ImageRef) -> Result<bool> {
        self.client(host)?.image_exists(reference).await
    }

    pub async fn pull_image(&self, host: &str, repository: &str, tag: Option<&str>) -> Result<bool> {
        self.client(host)?.pull_image(repository, tag).await
    }

    pub async fn inspect_container(&self, host: &str, id: &ContainerId) -> Result<ContainerInfo> {
        self.client(host)?.inspect_container(id).await
    }

    /// Create and start a Redis container; see [`ContainerOps::provision`].
    pub async fn provision(&self, host: &str, spec: &RedisContainerSpec) -> Result<ContainerId> {
        self.client(host)?.provision(spec).await
    }

    pub async fn create_container(
        &self,
        host: &str,
        spec: &RedisContainerSpec,
    ) -> Result<ContainerId> {
        self.client(host)?.create_container(spec).await
    }

    pub async fn start_container(&self, host: &str, id: &ContainerId) -> Result<()> {
        self.client(host)?.start_container(id).await
    }

    pub async fn restart_container(&self, host: &str, id: &ContainerId) -> Result<()> {
        self.client(host)?.restart_container(id).await
    }

    pub async fn stop_container(&self, host: &str, id: &ContainerId) -> Result<()> {
        self.client(host)?.stop_container(id).await
    }

    pub async fn remove_container(&self, host: &str, id: &ContainerId) -> Result<()> {
        self.client(host)?.remove_container(id).await
    }
}
