// ABOUTME: Library root for redis-engine.
// ABOUTME: Provisions and manages Redis containers on remote Docker Engine hosts.

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use config::GatewayConfig;
pub use engine::{EngineClient, EngineGateway, TransportPool};
pub use error::{ErrorKind, GatewayError, Result};
