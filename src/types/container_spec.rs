// ABOUTME: Inputs for provisioning a Redis container on a host.
// ABOUTME: Derives the container name and data-volume bind from the port.

use super::ImageRef;

/// Host directory that holds one subdirectory per Redis port.
pub const DATA_ROOT: &str = "/data/redis";

/// Where the data directory appears inside the container.
pub const CONTAINER_DATA_DIR: &str = "/data";

/// Redis containers share the host network namespace, so no port mapping.
pub const NETWORK_MODE: &str = "host";

/// What to run: image, port, a human name prefix, and the command arguments.
///
/// Only these four are caller-supplied. Network mode and the bind mount
/// follow fixed conventions and are derived here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisContainerSpec {
    pub port: u16,
    pub image: ImageRef,
    pub name_prefix: String,
    pub command: Vec<String>,
}

impl RedisContainerSpec {
    pub fn new(
        port: u16,
        image: ImageRef,
        name_prefix: impl Into<String>,
        command: Vec<String>,
    ) -> Self {
        Self {
            port,
            image,
            name_prefix: name_prefix.into(),
            command,
        }
    }

    /// `<prefix with spaces as hyphens>-<port>`, e.g. `redis-instance-8000`.
    pub fn container_name(&self) -> String {
        format!("{}-{}", self.name_prefix.replace(' ', "-"), self.port)
    }

    /// Host side of the data bind.
    pub fn host_data_dir(&self) -> String {
        format!("{}/{}", DATA_ROOT, self.port)
    }

    /// Bind in engine `host:container` form, e.g. `/data/redis/8000:/data`.
    pub fn volume_bind(&self) -> String {
        format!("{}:{}", self.host_data_dir(), CONTAINER_DATA_DIR)
    }
}
