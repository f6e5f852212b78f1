// ABOUTME: Image operations trait.
// ABOUTME: Search the registry, list and check local images, pull.

use super::sealed::Sealed;
use crate::error::Result;
use crate::types::{ImageId, ImageRef};
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Names of registry repositories matching `term`, in engine order.
    async fn search_images(&self, term: &str) -> Result<Vec<String>>;

    /// Every tag-qualified reference on the host mapped to its image id.
    ///
    /// An image with several tags appears once per tag. `None` (or an empty
    /// filter) lists everything.
    async fn list_images(&self, filter: Option<&str>) -> Result<BTreeMap<String, ImageId>>;

    /// Pull `repository[:tag]` and wait for the engine to finish.
    ///
    /// Without a tag the engine picks its default, normally `latest`.
    async fn pull_image(&self, repository: &str, tag: Option<&str>) -> Result<bool>;

    /// True iff listing images filtered by `reference` yields anything.
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool> {
        let name = reference.to_string();
        let images = self.list_images(Some(&name)).await?;
        Ok(!images.is_empty())
    }
}
