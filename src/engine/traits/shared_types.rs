// ABOUTME: Value types returned by engine operations.
// ABOUTME: EngineInfo, ContainerInfo, and the observed ContainerState.

use crate::types::ContainerId;
use serde::Serialize;

/// Engine and host metadata from the engine's info endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineInfo {
    /// Host name as the engine reports it.
    pub name: String,
    pub server_version: String,
    pub operating_system: String,
    pub architecture: String,
    pub cpus: i64,
    /// Total memory in bytes.
    pub memory_total: i64,
    pub containers: i64,
    pub containers_running: i64,
    pub containers_paused: i64,
    pub containers_stopped: i64,
    pub images: i64,
}

/// Snapshot of a container as the engine reports it.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub id: ContainerId,
    /// Container name without the engine's leading `/`.
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub created: String,
    pub network_mode: Option<String>,
    /// Bind mounts in `host:container[:mode]` form.
    pub binds: Vec<String>,
    pub command: Vec<String>,
}

/// Container state as observed, not owned, by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl ContainerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running | ContainerState::Restarting)
    }
}
