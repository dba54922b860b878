mod client;
mod dry_run;

pub use client::{InstagramPublisher, GRAPH_API_URL};
pub use dry_run::DryRunPublisher;

use crate::error::RoundupResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// Uploads albums of images
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Publish the images, in order, as one album and return the media id
    async fn publish_album(&self, image_paths: &[PathBuf], caption: &str) -> RoundupResult<String>;
}
