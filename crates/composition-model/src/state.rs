//! Composition state: the inputs the compositor paints from.

use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::placement::StickerPlacement;

/// A decoded base photo.
///
/// Pixel data is shared, so snapshots of the state are cheap.
#[derive(Debug, Clone)]
pub struct BaseImage {
    pixels: Arc<RgbaImage>,
    format: ImageFormat,
}

impl BaseImage {
    /// Decode an image from raw file bytes.
    ///
    /// Bytes that are not a recognised image format are rejected as
    /// unsupported media before any decoding is attempted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompositionError> {
        let format = image::guess_format(bytes).map_err(|_| CompositionError::UnsupportedMedia {
            message: "input is not a recognised image format".to_string(),
        })?;
        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            CompositionError::Decode {
                message: format!("failed to decode {} image: {e}", format.to_mime_type()),
            }
        })?;
        Ok(Self {
            pixels: Arc::new(decoded.to_rgba8()),
            format,
        })
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CompositionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| CompositionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Wrap already-decoded pixels.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format: ImageFormat::Png,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Shared handle to the pixel data.
    pub fn shared_pixels(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.pixels)
    }

    /// Natural (intrinsic) pixel dimensions.
    pub fn natural_dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Everything the user has put into the current composition.
#[derive(Debug, Clone, Default)]
pub struct CompositionState {
    base_image: Option<BaseImage>,
    caption: String,
    placements: Arc<[StickerPlacement]>,
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the base image. Clears the placement set; the caption survives.
    pub fn load_base_image(&mut self, image: BaseImage) {
        self.base_image = Some(image);
        self.placements = Arc::from(Vec::new());
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base_image.as_ref()
    }

    pub fn has_base_image(&self) -> bool {
        self.base_image.is_some()
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    /// Placements in paint order.
    pub fn placements(&self) -> &[StickerPlacement] {
        &self.placements
    }

    /// Shared handle to the current placement set.
    pub fn shared_placements(&self) -> Arc<[StickerPlacement]> {
        Arc::clone(&self.placements)
    }

    /// Swap in a complete new placement set.
    pub fn replace_placements(&mut self, placements: Vec<StickerPlacement>) {
        self.placements = Arc::from(placements);
    }
}

/// Errors produced while building composition inputs.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported media: {message}")]
    UnsupportedMedia { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },
}
