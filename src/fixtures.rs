//! Synthetic image fixtures for the detection endpoints.
//!
//! The backend only needs decodable JPEGs; a blank white frame exercises the
//! "no plate found" path while [`plate_frame`] gives the detector something
//! plate-shaped to look at.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::codecs::jpeg::JpegEncoder;

use crate::config::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use crate::harness::types::HarnessResult;

const JPEG_QUALITY: u8 = 90;

/// A virtual RGB framebuffer for building test images
///
/// Provides a small drawing API:
/// - `fill()` - Fill entire buffer with a color
/// - `draw_rect()` - Draw a filled rectangle
/// - `draw_text()` - Draw text using font8x8 glyphs, optionally scaled
/// - `get_pixel()` / `set_pixel()` - Direct pixel access
#[derive(Debug, Clone)]
pub struct TestImage {
    width: u32,
    height: u32,
    /// RGB pixel buffer (row-major, 3 bytes per pixel)
    buffer: Vec<u8>,
}

impl TestImage {
    /// Create a new image with the given dimensions, initialized to black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; (width * height * 3) as usize],
        }
    }

    /// Create an image initialized to a specific color
    pub fn with_color(width: u32, height: u32, color: [u8; 3]) -> Self {
        let mut img = Self::new(width, height);
        img.fill(color);
        img
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for chunk in self.buffer.chunks_exact_mut(3) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Draw a filled rectangle, clipped to the image
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text with 8x8 glyphs, each pixel blown up to `scale`x`scale`.
    ///
    /// Text does not wrap; background pixels are left untouched.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, scale: u32, color: [u8; 3]) {
        let scale = scale.max(1);
        let mut cursor_x = x;
        for ch in text.chars() {
            if cursor_x >= self.width {
                break;
            }
            self.draw_char(cursor_x, y, ch, scale, color);
            cursor_x += 8 * scale;
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, scale: u32, color: [u8; 3]) {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0u8; 8]);
        for (row_idx, row) in glyph.iter().enumerate() {
            for bit in 0..8 {
                // font8x8 stores LSB as leftmost pixel
                if (row >> bit) & 1 == 1 {
                    self.draw_rect(
                        x + bit * scale,
                        y + row_idx as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = ((y * self.width + x) * 3) as usize;
        [self.buffer[idx], self.buffer[idx + 1], self.buffer[idx + 2]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.buffer[idx..idx + 3].copy_from_slice(&color);
    }

    /// Encode the image as baseline JPEG bytes
    pub fn to_jpeg(&self) -> HarnessResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        encoder.encode(&self.buffer, self.width, self.height, image::ColorType::Rgb8)?;
        Ok(bytes)
    }
}

/// Plain white 640x480 JPEG
pub fn white_frame() -> HarnessResult<Vec<u8>> {
    TestImage::with_color(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT, [255, 255, 255]).to_jpeg()
}

/// 640x480 JPEG with a bordered plate carrying `text` in the middle
pub fn plate_frame(text: &str) -> HarnessResult<Vec<u8>> {
    let mut img = TestImage::with_color(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT, [255, 255, 255]);

    let (plate_w, plate_h) = (320, 90);
    let plate_x = (DEFAULT_FRAME_WIDTH - plate_w) / 2;
    let plate_y = (DEFAULT_FRAME_HEIGHT - plate_h) / 2;

    img.draw_rect(plate_x, plate_y, plate_w, plate_h, [0, 0, 0]);
    img.draw_rect(plate_x + 6, plate_y + 6, plate_w - 12, plate_h - 12, [250, 250, 250]);

    let scale = 4;
    let text_w = text.chars().count() as u32 * 8 * scale;
    let text_x = plate_x + plate_w.saturating_sub(text_w) / 2;
    let text_y = plate_y + (plate_h - 8 * scale) / 2;
    img.draw_text(text_x, text_y, text, scale, [0, 0, 0]);

    img.to_jpeg()
}
