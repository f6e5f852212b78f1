// ABOUTME: Gateway configuration loaded from engine.yml.
// ABOUTME: Endpoint template plus shared transport pool limits, with env override.

mod endpoint;
mod pool;

pub use endpoint::{DEFAULT_ENDPOINT, EndpointTemplate, HOST_PLACEHOLDER, ParseEndpointError};
pub use pool::{MAX_CONNECTIONS, PoolConfig};

use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "engine.yml";
pub const CONFIG_FILENAME_ALT: &str = "engine.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".redis-engine/engine.yml";

/// Overrides the endpoint template from the config file.
pub const ENDPOINT_ENV: &str = "REDIS_ENGINE_ENDPOINT";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("failed to read {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse configuration: {source}"))]
    Parse { source: serde_yaml::Error },

    #[snafu(display("configuration file not found in {}", dir.display()))]
    NotFound { dir: PathBuf },

    #[snafu(display("invalid endpoint template {template:?}: {source}"))]
    InvalidEndpoint {
        template: String,
        source: ParseEndpointError,
    },

    #[snafu(display("invalid pool configuration: {reason}"))]
    InvalidPool { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub endpoint: EndpointTemplate,

    #[serde(default)]
    pub pool: PoolConfig,
}

impl GatewayConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = serde_yaml::from_str(yaml).context(ParseSnafu)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        NotFoundSnafu { dir }.fail()
    }

    /// Apply `REDIS_ENGINE_ENDPOINT` if it is set.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(template) = std::env::var(ENDPOINT_ENV) {
            self.endpoint =
                EndpointTemplate::parse(&template).context(InvalidEndpointSnafu { template })?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.max_total_connections == 0 || self.pool.max_per_route_connections == 0 {
            return InvalidPoolSnafu {
                reason: "connection limits must be at least 1",
            }
            .fail();
        }
        if self.pool.max_total_connections > MAX_CONNECTIONS {
            return InvalidPoolSnafu {
                reason: format!("max_total_connections exceeds {}", MAX_CONNECTIONS),
            }
            .fail();
        }
        if self.pool.max_per_route_connections > self.pool.max_total_connections {
            return InvalidPoolSnafu {
                reason: "max_per_route_connections exceeds max_total_connections",
            }
            .fail();
        }
        Ok(())
    }
}
