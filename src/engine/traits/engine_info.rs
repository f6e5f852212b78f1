// ABOUTME: Engine metadata trait.
// ABOUTME: Query host/engine info and check connectivity.

use super::sealed::Sealed;
use super::shared_types::EngineInfo;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait EngineInfoOps: Sealed + Send + Sync {
    /// Engine version, resource counts, and host details.
    async fn info(&self) -> Result<EngineInfo>;

    /// Ping the engine to check connectivity.
    async fn ping(&self) -> Result<()>;
}
