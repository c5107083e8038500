//! The raster surface stickers are painted onto.

use image::{Rgba, RgbaImage};

/// A resizable RGBA raster.
///
/// Resizing discards the previous contents, so it should happen exactly
/// once per new base image.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// A zero-sized surface.
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
        }
    }

    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Set the pixel dimensions, clearing all contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "Resizing surface");
        self.pixels = RgbaImage::new(width, height);
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}
