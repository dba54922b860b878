use std::path::Path;
use tracing::debug;

use super::canvas::{line_height, wrap_text, Canvas, Fonts, BLACK, CARD_SIZE, PADDING, WHITE};
use super::{ImageRenderer, IntroCard};
use crate::components::events::Event;
use crate::config::BrandSettings;
use crate::error::RoundupResult;
use crate::utils::time::format_post_date;

const PANEL_PADDING: u32 = 20;
const BULLET: &str = "•";
const BULLET_INDENT: i32 = 75;

/// Renders intro and event cards as branded JPEGs
pub struct CardRenderer {
    fonts: Fonts,
    brand: BrandSettings,
}

impl CardRenderer {
    /// Create a renderer, loading fonts from `font_dir`
    pub fn new(font_dir: &Path, brand: BrandSettings) -> Self {
        Self {
            fonts: Fonts::load(font_dir),
            brand,
        }
    }

    /// Light panel across the top with two centred lines
    fn draw_header(&self, canvas: &mut Canvas, title: (&str, f32), subtitle: (&str, f32)) -> i32 {
        let panel_height = line_height(title.1) + line_height(subtitle.1) + 2 * PANEL_PADDING;
        let panel_width = CARD_SIZE - 2 * PADDING as u32;
        let panel_x = (canvas.width() - panel_width) / 2;
        canvas.fill_panel(panel_x, PADDING as u32, panel_width, panel_height);

        let mut y = PADDING + PANEL_PADDING as i32;
        y += canvas.draw_centered(self.fonts.bold.as_ref(), title.1, y, BLACK, title.0) as i32;
        canvas.draw_centered(self.fonts.regular.as_ref(), subtitle.1, y, BLACK, subtitle.0);

        PADDING + panel_height as i32
    }

    /// Bulleted, wrapped paragraph; returns the y position below it
    fn draw_bullet(&self, canvas: &mut Canvas, text: &str, size: f32, wrap: usize, mut y: i32) -> i32 {
        let font = self.fonts.regular.as_ref();
        for (i, line) in wrap_text(text, wrap).iter().enumerate() {
            if i == 0 {
                canvas.draw_text(font, size, PADDING, y, WHITE, BULLET);
            }
            y += canvas.draw_text(font, size, PADDING + BULLET_INDENT, y, WHITE, line) as i32;
        }
        y
    }

    /// Follow call-out in a panel at the bottom of the card
    fn draw_footer(&self, canvas: &mut Canvas, size: f32) {
        let message = format!("Follow @{} for more updates", self.brand.handle);
        let height = line_height(size);
        let y = (CARD_SIZE as i32) - PADDING - height as i32;
        let panel_width = CARD_SIZE - 2 * PADDING as u32 - 2 * PANEL_PADDING;
        let panel_x = (canvas.width() - panel_width) / 2;
        canvas.fill_panel(
            panel_x,
            (y - PANEL_PADDING as i32).max(0) as u32,
            panel_width,
            height + 2 * PANEL_PADDING,
        );
        canvas.draw_centered(self.fonts.regular.as_ref(), size, y, BLACK, &message);
    }
}

impl ImageRenderer for CardRenderer {
    fn render_intro(&self, card: &IntroCard, path: &Path) -> RoundupResult<()> {
        debug!("Rendering intro card for batch {}/{}", card.batch_no, card.total_batches);
        let mut canvas = Canvas::new();

        let post_date = format_post_date(card.post_date);
        let mut y = self.draw_header(&mut canvas, (self.brand.name.as_str(), 65.0), (post_date.as_str(), 50.0));

        if card.total_batches > 1 {
            y += 30;
            let part = format!("Part {} of {}", card.batch_no, card.total_batches);
            y += canvas.draw_centered(self.fonts.bold.as_ref(), 50.0, y, WHITE, &part) as i32;
        }

        y = y.max(350) + 30;
        for line in &self.brand.intro_lines {
            y = self.draw_bullet(&mut canvas, line, 50.0, 36, y) + 40;
        }

        self.draw_footer(&mut canvas, 50.0);
        canvas.save(path)
    }

    fn render_event(&self, event: &Event, path: &Path) -> RoundupResult<()> {
        debug!("Rendering event card for '{}'", event.title);
        let mut canvas = Canvas::new();

        self.draw_header(&mut canvas, (self.brand.name.as_str(), 50.0), (self.brand.calendar_link.as_str(), 45.0));

        let mut y = 250;
        for line in wrap_text(&event.title, 36) {
            y += canvas.draw_text(self.fonts.bold.as_ref(), 50.0, PADDING, y, WHITE, &line) as i32;
        }
        y += 30;

        y = self.draw_bullet(&mut canvas, &event.formatted_date(), 45.0, 40, y);
        if let Some(start_time) = event.formatted_start_time() {
            y = self.draw_bullet(&mut canvas, &start_time, 45.0, 40, y);
        }
        let location = event.location.trim();
        if !location.is_empty() {
            self.draw_bullet(&mut canvas, location, 45.0, 40, y);
        }

        self.draw_footer(&mut canvas, 45.0);
        canvas.save(path)
    }
}
