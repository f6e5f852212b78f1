// ABOUTME: Docker Engine access for Redis hosts.
// ABOUTME: Gateway facade, per-host bollard client, shared transport pool, capability traits.

mod client;
mod gateway;
pub mod traits;
mod transport;

pub use client::EngineClient;
pub use gateway::EngineGateway;
pub use traits::{
    ContainerInfo, ContainerOps, ContainerState, EngineInfo, EngineInfoOps, FullEngine, ImageOps,
};
pub use transport::TransportPool;
