mod canvas;
mod renderer;

pub use renderer::CardRenderer;

use crate::components::events::Event;
use crate::error::RoundupResult;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// File name of the first image in every album
pub const INTRO_IMAGE_NAME: &str = "intro_image.jpg";

/// Metadata drawn on a batch's intro image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroCard {
    pub batch_no: usize,
    pub total_batches: usize,
    pub post_date: NaiveDate,
}

/// Draws cards to image files
pub trait ImageRenderer: Send + Sync {
    /// Write the intro image for a batch to `path`
    fn render_intro(&self, card: &IntroCard, path: &Path) -> RoundupResult<()>;

    /// Write the image for a single event to `path`
    fn render_event(&self, event: &Event, path: &Path) -> RoundupResult<()>;
}

/// Directory holding one batch's images
pub fn batch_dir(base: &Path, batch_no: usize) -> PathBuf {
    base.join("batches").join(batch_no.to_string())
}

/// Path of a batch's intro image
pub fn intro_image_path(base: &Path, batch_no: usize) -> PathBuf {
    batch_dir(base, batch_no).join(INTRO_IMAGE_NAME)
}

/// File name of the `sequence`th event image, counting from 1
pub fn event_image_name(sequence: usize) -> String {
    format!("event_image_{:02}.jpg", sequence)
}

/// Path of the `sequence`th event image in a batch
pub fn event_image_path(base: &Path, batch_no: usize, sequence: usize) -> PathBuf {
    batch_dir(base, batch_no).join(event_image_name(sequence))
}
