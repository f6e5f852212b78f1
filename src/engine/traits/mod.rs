// ABOUTME: Composable capability traits for the engine client.
// ABOUTME: Defines EngineInfoOps, ImageOps, ContainerOps.

mod container;
mod engine_info;
mod image;
pub(crate) mod sealed;
mod shared_types;

pub use container::ContainerOps;
pub use engine_info::EngineInfoOps;
pub use image::ImageOps;
pub use shared_types::*;

/// Everything the gateway needs from one host.
pub trait FullEngine: EngineInfoOps + ImageOps + ContainerOps {}

impl<T> FullEngine for T where T: EngineInfoOps + ImageOps + ContainerOps {}
