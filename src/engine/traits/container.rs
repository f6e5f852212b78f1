// ABOUTME: Container lifecycle trait.
// ABOUTME: Create, start, restart, stop, remove, inspect, and provision Redis containers.

use super::sealed::Sealed;
use super::shared_types::ContainerInfo;
use crate::error::Result;
use crate::types::{ContainerId, RedisContainerSpec};
use async_trait::async_trait;

#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// Create (but do not start) a container for `spec`.
    ///
    /// The container runs in host network mode with `/data/redis/<port>`
    /// bound to `/data`, named after the spec's prefix and port.
    async fn create_container(&self, spec: &RedisContainerSpec) -> Result<ContainerId>;

    async fn start_container(&self, id: &ContainerId) -> Result<()>;

    /// Restart with the engine's default grace period.
    async fn restart_container(&self, id: &ContainerId) -> Result<()>;

    /// Graceful stop with the engine's default timeout.
    async fn stop_container(&self, id: &ContainerId) -> Result<()>;

    /// Remove without forcing; the engine refuses running containers.
    async fn remove_container(&self, id: &ContainerId) -> Result<()>;

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo>;

    /// Create then start.
    ///
    /// Not transactional: if start fails the created container stays behind
    /// and the start error is returned. Cleaning it up is the caller's job.
    async fn provision(&self, spec: &RedisContainerSpec) -> Result<ContainerId> {
        let id = self.create_container(spec).await?;

        if let Err(e) = self.start_container(&id).await {
            tracing::warn!(
                container = %id,
                name = %spec.container_name(),
                "start failed after create, container left in created state: {}",
                e
            );
            return Err(e);
        }

        tracing::info!(container = %id, name = %spec.container_name(), "provisioned");
        Ok(id)
    }
}
