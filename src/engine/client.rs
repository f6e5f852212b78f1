// ABOUTME: Bollard-based engine client bound to a single host.
// ABOUTME: Implements the engine capability traits over the shared transport pool.

use super::traits::sealed::Sealed;
use super::traits::{
    ContainerInfo, ContainerOps, ContainerState, EngineInfo, EngineInfoOps, ImageOps,
};
use super::transport::{Lease, Route, TransportPool};
use crate::config::EndpointTemplate;
use crate::error::{GatewayError, Result};
use crate::types::{ContainerId, ImageId, NETWORK_MODE, RedisContainerSpec};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerStateStatusEnum, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, ListImagesOptions,
    RemoveContainerOptions, RestartContainerOptions, SearchImagesOptions, StartContainerOptions,
    StopContainerOptions,
};
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Engine client for one host.
///
/// Cheap to build: it borrows the pool's transport for the host's route.
/// The gateway builds a fresh one for every call.
pub struct EngineClient {
    host: String,
    endpoint: String,
    route: Route,
    pool: Arc<TransportPool>,
}

impl EngineClient {
    /// Bind a client to `host` using the pool's transport for its endpoint.
    pub fn connect(
        pool: Arc<TransportPool>,
        template: &EndpointTemplate,
        host: &str,
    ) -> Result<Self> {
        let endpoint = template.render(host);
        let route = pool.route(&endpoint)?;
        Ok(Self {
            host: host.to_string(),
            endpoint,
            route,
            pool,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Rendered management endpoint, e.g. `http://10.0.0.5:2375`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn lease(&self) -> Result<Lease> {
        self.pool.acquire(&self.route).await
    }

    fn docker(&self) -> &Docker {
        &self.route.docker
    }

    /// Await one engine request, body included, within the request deadline.
    async fn bounded<T, F>(&self, op: &str, request: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, bollard::errors::Error>> + Send,
        T: Send,
    {
        let deadline = self.pool.config().request_timeout();
        match tokio::time::timeout(deadline, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(self.timed_out(op, deadline)),
        }
    }

    fn timed_out(&self, op: &str, after: Duration) -> GatewayError {
        GatewayError::Connection(format!(
            "{} on {} timed out after {:?}",
            op, self.endpoint, after
        ))
    }
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("host", &self.host)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn container_state(status: Option<ContainerStateStatusEnum>) -> ContainerState {
    match status {
        Some(ContainerStateStatusEnum::CREATED) => ContainerState::Created,
        Some(ContainerStateStatusEnum::RUNNING) => ContainerState::Running,
        Some(ContainerStateStatusEnum::PAUSED) => ContainerState::Paused,
        Some(ContainerStateStatusEnum::RESTARTING) => ContainerState::Restarting,
        Some(ContainerStateStatusEnum::REMOVING) => ContainerState::Removing,
        Some(ContainerStateStatusEnum::EXITED) => ContainerState::Exited,
        Some(ContainerStateStatusEnum::DEAD) => ContainerState::Dead,
        _ => ContainerState::Unknown,
    }
}

/// Body for creating the container described by `spec`.
fn create_body(spec: &RedisContainerSpec) -> ContainerCreateBody {
    ContainerCreateBody {
        image: Some(spec.image.to_string()),
        cmd: Some(spec.command.clone()),
        host_config: Some(HostConfig {
            network_mode: Some(NETWORK_MODE.to_string()),
            binds: Some(vec![spec.volume_bind()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl Sealed for EngineClient {}

#[async_trait]
impl EngineInfoOps for EngineClient {
    async fn info(&self) -> Result<EngineInfo> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, "engine info");

        let info = self.bounded("info", self.docker().info()).await?;

        Ok(EngineInfo {
            name: info.name.unwrap_or_default(),
            server_version: info.server_version.unwrap_or_default(),
            operating_system: info.operating_system.unwrap_or_default(),
            architecture: info.architecture.unwrap_or_default(),
            cpus: info.ncpu.unwrap_or_default(),
            memory_total: info.mem_total.unwrap_or_default(),
            containers: info.containers.unwrap_or_default(),
            containers_running: info.containers_running.unwrap_or_default(),
            containers_paused: info.containers_paused.unwrap_or_default(),
            containers_stopped: info.containers_stopped.unwrap_or_default(),
            images: info.images.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<()> {
        let _lease = self.lease().await?;
        self.bounded("ping", self.docker().ping()).await?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for EngineClient {
    async fn search_images(&self, term: &str) -> Result<Vec<String>> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, term, "search images");

        let opts = SearchImagesOptions {
            term: term.to_string(),
            ..Default::default()
        };
        let items = self
            .bounded("search images", self.docker().search_images(opts))
            .await?;

        Ok(items.into_iter().filter_map(|item| item.name).collect())
    }

    async fn list_images(&self, filter: Option<&str>) -> Result<BTreeMap<String, ImageId>> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, filter, "list images");

        let filters = filter.filter(|f| !f.is_empty()).map(|name| {
            let mut filters = HashMap::new();
            filters.insert("reference".to_string(), vec![name.to_string()]);
            filters
        });
        let opts = ListImagesOptions {
            filters,
            ..Default::default()
        };
        let images = self
            .bounded("list images", self.docker().list_images(Some(opts)))
            .await?;

        let mut tagged = BTreeMap::new();
        for image in images {
            for tag in image.repo_tags {
                // Dangling images report a placeholder instead of a real tag.
                if tag == "<none>:<none>" {
                    continue;
                }
                tagged.insert(tag, ImageId::new(image.id.clone()));
            }
        }
        Ok(tagged)
    }

    async fn pull_image(&self, repository: &str, tag: Option<&str>) -> Result<bool> {
        let _lease = self.lease().await?;
        let tag = tag.filter(|t| !t.is_empty());
        tracing::debug!(host = %self.host, repository, tag, "pull image");

        let opts = CreateImageOptions {
            from_image: Some(repository.to_string()),
            tag: tag.map(str::to_string),
            ..Default::default()
        };

        // The pull finishes when the progress stream ends. The first item
        // waits on the whole request; later ones only on the read timeout.
        let mut stream = self.docker().create_image(Some(opts), None, None);
        let mut wait = self.pool.config().request_timeout();
        loop {
            let next = tokio::time::timeout(wait, stream.next())
                .await
                .map_err(|_| self.timed_out("pull image", wait))?;
            let Some(progress) = next else {
                break;
            };
            if let Some(status) = progress?.status {
                tracing::trace!(host = %self.host, repository, "{}", status);
            }
            wait = self.pool.config().read_timeout;
        }

        Ok(true)
    }
}

#[async_trait]
impl ContainerOps for EngineClient {
    async fn create_container(&self, spec: &RedisContainerSpec) -> Result<ContainerId> {
        let _lease = self.lease().await?;
        let name = spec.container_name();
        tracing::debug!(
            host = %self.host,
            name = %name,
            image = %spec.image,
            bind = %spec.volume_bind(),
            "create container"
        );

        let opts = CreateContainerOptions {
            name: Some(name),
            ..Default::default()
        };
        let response = self
            .bounded(
                "create container",
                self.docker().create_container(Some(opts), create_body(spec)),
            )
            .await?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<()> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, container = %id, "start container");

        self.bounded(
            "start container",
            self.docker().start_container(id.as_str(), None::<StartContainerOptions>),
        )
        .await?;
        Ok(())
    }

    async fn restart_container(&self, id: &ContainerId) -> Result<()> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, container = %id, "restart container");

        self.bounded(
            "restart container",
            self.docker().restart_container(id.as_str(), None::<RestartContainerOptions>),
        )
        .await?;
        Ok(())
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<()> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, container = %id, "stop container");

        self.bounded(
            "stop container",
            self.docker().stop_container(id.as_str(), None::<StopContainerOptions>),
        )
        .await?;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<()> {
        let _lease = self.lease().await?;
        tracing::debug!(host = %self.host, container = %id, "remove container");

        self.bounded(
            "remove container",
            self.docker().remove_container(id.as_str(), None::<RemoveContainerOptions>),
        )
        .await?;
        Ok(())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo> {
        let _lease = self.lease().await?;

        let details = self
            .bounded(
                "inspect container",
                self.docker()
                    .inspect_container(id.as_str(), None::<InspectContainerOptions>),
            )
            .await?;

        let host_config = details.host_config.unwrap_or_default();
        let config = details.config.unwrap_or_default();

        Ok(ContainerInfo {
            id: details.id.map(ContainerId::new).unwrap_or_else(|| id.clone()),
            name: details
                .name
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string(),
            image: config.image.unwrap_or_default(),
            state: container_state(details.state.and_then(|s| s.status)),
            created: details.created.map(|dt| dt.to_string()).unwrap_or_default(),
            network_mode: host_config.network_mode,
            binds: host_config.binds.unwrap_or_default(),
            command: config.cmd.unwrap_or_default(),
        })
    }
}
