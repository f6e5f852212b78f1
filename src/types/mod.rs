// ABOUTME: Value types passed to and returned from the engine gateway.
// ABOUTME: Phantom-typed ids, image references, and the Redis container spec.

mod container_spec;
mod id;
mod image_ref;

pub use container_spec::{CONTAINER_DATA_DIR, DATA_ROOT, NETWORK_MODE, RedisContainerSpec};
pub use id::{ContainerId, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
