use crate::components::airtable::SelectionWindow;
use crate::config::BrandSettings;

/// Writes the caption for each album
#[derive(Debug, Clone)]
pub struct CaptionBuilder {
    brand: BrandSettings,
}

impl CaptionBuilder {
    pub fn new(brand: BrandSettings) -> Self {
        Self { brand }
    }

    /// Caption for batch `batch_no` of `total_batches`
    pub fn caption(&self, batch_no: usize, total_batches: usize, window: SelectionWindow) -> String {
        let mut headline = format!("🇮🇱 {}", self.brand.headline);
        if let SelectionWindow::Cutoff { days } = window {
            headline.push_str(&format!(" (next {} days)", days));
        }
        if total_batches > 1 {
            headline.push_str(&format!(" [{}/{}]", batch_no, total_batches));
        }
        headline.push_str(" ⤵️");

        [
            headline,
            format!("🔗 Check out {} for more details.", self.brand.calendar_link),
            format!("👉 {}", self.brand.call_to_action),
        ]
        .join("\n")
    }
}
