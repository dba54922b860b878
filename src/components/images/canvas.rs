use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{render_error, RoundupResult};

/// Side of the square drawing area, excluding the border
pub const CARD_SIZE: u32 = 1080;
pub const BORDER: u32 = 15;
pub const PADDING: i32 = 60;

pub const BACKGROUND: Rgb<u8> = Rgb([0, 92, 144]);
pub const BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const PANEL_COLOR: Rgb<u8> = Rgb([232, 232, 232]);
pub const PANEL_ALPHA: f32 = 200.0 / 255.0;
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const BOLD_FONT_FILE: &str = "NotoSans-Bold.ttf";
const REGULAR_FONT_FILE: &str = "NotoSans-Regular.ttf";

/// Typefaces used on cards; missing fonts mean text is skipped
pub struct Fonts {
    pub bold: Option<FontVec>,
    pub regular: Option<FontVec>,
}

impl Fonts {
    /// Load the card fonts from a directory
    pub fn load(dir: &Path) -> Self {
        Self {
            bold: load_font(&dir.join(BOLD_FONT_FILE)),
            regular: load_font(&dir.join(REGULAR_FONT_FILE)),
        }
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Font not found at {}, text will be skipped: {}", path.display(), e);
            return None;
        }
    };
    match FontVec::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Failed to load font {}: {}", path.display(), e);
            None
        }
    }
}

/// A bordered, square card being drawn
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new() -> Self {
        let side = CARD_SIZE + 2 * BORDER;
        let mut image = RgbImage::from_pixel(side, side, BACKGROUND);
        for inset in 0..BORDER {
            let rect = Rect::at(inset as i32, inset as i32).of_size(side - 2 * inset, side - 2 * inset);
            draw_hollow_rect_mut(&mut image, rect, BORDER_COLOR);
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Blend a translucent light panel over a rectangle
    pub fn fill_panel(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = (x + width).min(self.image.width());
        let y_end = (y + height).min(self.image.height());
        for py in y..y_end {
            for px in x..x_end {
                let pixel = self.image.get_pixel_mut(px, py);
                for (channel, panel) in pixel.0.iter_mut().zip(PANEL_COLOR.0) {
                    let blended = f32::from(*channel) * (1.0 - PANEL_ALPHA) + f32::from(panel) * PANEL_ALPHA;
                    *channel = blended.round() as u8;
                }
            }
        }
    }

    /// Draw one line of text and return the height it took
    pub fn draw_text(&mut self, font: Option<&FontVec>, size: f32, x: i32, y: i32, color: Rgb<u8>, text: &str) -> u32 {
        if let Some(font) = font {
            draw_text_mut(&mut self.image, color, x, y, PxScale::from(size), font, text);
        }
        line_height(size)
    }

    /// Draw one line of text centred horizontally
    pub fn draw_centered(&mut self, font: Option<&FontVec>, size: f32, y: i32, color: Rgb<u8>, text: &str) -> u32 {
        let text_width = font
            .map(|f| text_size(PxScale::from(size), f, text).0)
            .unwrap_or(0);
        let x = (self.width().saturating_sub(text_width) / 2) as i32;
        self.draw_text(font, size, x, y, color, text)
    }

    /// Encode as JPEG, creating the parent directory if needed
    pub fn save(self, path: &Path) -> RoundupResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        DynamicImage::ImageRgb8(self.image)
            .save_with_format(path, ImageFormat::Jpeg)
            .map_err(|e| render_error(&format!("Failed to write {}: {}", path.display(), e)))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertical space taken by a line of text at the given size
pub fn line_height(size: f32) -> u32 {
    (size * 1.3).round() as u32
}

/// Greedy word wrap to lines of at most `max_chars` characters
///
/// A single word longer than `max_chars` gets a line of its own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let lines = wrap_text("Stop the Hate: Rally for Jewish Students", 20);
        assert_eq!(lines, vec!["Stop the Hate: Rally", "for Jewish Students"]);
    }

    #[test]
    fn test_wrap_text_long_word_gets_own_line() {
        let lines = wrap_text("at Supercalifragilisticexpialidocious Hall", 10);
        assert_eq!(lines, vec!["at", "Supercalifragilisticexpialidocious", "Hall"]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_canvas_has_border_and_background() {
        let canvas = Canvas::new();
        assert_eq!(canvas.width(), CARD_SIZE + 2 * BORDER);
        assert_eq!(*canvas.image.get_pixel(0, 0), BORDER_COLOR);
        assert_eq!(*canvas.image.get_pixel(500, 500), BACKGROUND);
    }

    #[test]
    fn test_fill_panel_lightens_background() {
        let mut canvas = Canvas::new();
        canvas.fill_panel(100, 100, 10, 10);
        let pixel = canvas.image.get_pixel(105, 105);
        assert!(pixel.0[0] > BACKGROUND.0[0]);
        assert_eq!(*canvas.image.get_pixel(200, 200), BACKGROUND);
    }
}
