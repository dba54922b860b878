use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::SocialPublisher;
use crate::error::RoundupResult;

/// Publisher that only logs what would have been posted
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    albums: AtomicUsize,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SocialPublisher for DryRunPublisher {
    async fn publish_album(&self, image_paths: &[PathBuf], caption: &str) -> RoundupResult<String> {
        let album = self.albums.fetch_add(1, Ordering::SeqCst) + 1;
        info!("[dry run] Album {} with {} images", album, image_paths.len());
        for path in image_paths {
            info!("[dry run]   {}", path.display());
        }
        info!("[dry run] Caption:\n{}", caption);
        Ok(format!("dry-run-{}", album))
    }
}
