//! Export: flatten surface and caption into a standalone PNG.
//!
//! The export captures the composition as laid out on screen (the base
//! image fitted to the layout width) at a fixed upscale factor, so a
//! 400x300 image exports at 800x600 with the default 2x scale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use memeforge_common::config::ExportSettings;
use memeforge_common::error::{MemeforgeError, MemeforgeResult};

use crate::caption::CaptionRenderer;
use crate::surface::Surface;

/// A flattened, PNG-encoded composition.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    /// Encoded PNG bytes.
    pub png: Vec<u8>,

    /// Pixel width of the encoded image.
    pub width: u32,

    /// Pixel height of the encoded image.
    pub height: u32,

    /// Render timestamp (RFC 3339).
    pub rendered_at: String,
}

impl RenderedArtifact {
    pub const MIME_TYPE: &'static str = "image/png";

    /// Write the PNG to `dir/file_name`, creating `dir` if needed.
    pub fn save(&self, dir: &Path, file_name: &str) -> MemeforgeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, &self.png)?;
        tracing::info!(path = %path.display(), bytes = self.png.len(), "Saved artifact");
        Ok(path)
    }
}

/// Flattens compositions into PNG artifacts.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    settings: ExportSettings,
    caption: Option<Arc<CaptionRenderer>>,
}

impl ExportPipeline {
    pub fn new(settings: ExportSettings, caption: Option<CaptionRenderer>) -> Self {
        Self {
            settings,
            caption: caption.map(Arc::new),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn has_caption_renderer(&self) -> bool {
        self.caption.is_some()
    }

    /// On-screen size of a composition whose surface is `width` x `height`.
    pub fn layout_size(&self, width: u32, height: u32) -> (u32, u32) {
        let max_width = self.settings.layout_max_width.max(1);
        if width <= max_width {
            return (width, height);
        }
        let fitted_height = (height as f64 * max_width as f64 / width as f64).round() as u32;
        (max_width, fitted_height.max(1))
    }

    /// Pixel size of the exported artifact.
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (lw, lh) = self.layout_size(width, height);
        let scale = self.scale() as f64;
        (
            ((lw as f64 * scale).round() as u32).max(1),
            ((lh as f64 * scale).round() as u32).max(1),
        )
    }

    fn scale(&self) -> f32 {
        if self.settings.scale.is_finite() && self.settings.scale > 0.0 {
            self.settings.scale
        } else {
            1.0
        }
    }

    /// Flatten `surface` plus `caption` into a PNG.
    ///
    /// An empty surface means no base image is loaded; that is refused
    /// rather than producing an empty artifact.
    pub fn export(&self, surface: &Surface, caption: &str) -> MemeforgeResult<RenderedArtifact> {
        if surface.is_empty() {
            return Err(MemeforgeError::NoBaseImage);
        }

        let started = std::time::Instant::now();
        let (sw, sh) = surface.dimensions();
        let (lw, lh) = self.layout_size(sw, sh);
        let (width, height) = self.output_size(sw, sh);
        let scale = width as f32 / lw as f32;

        let mut flat: RgbaImage = if (width, height) == (sw, sh) {
            surface.pixels().clone()
        } else {
            imageops::resize(surface.pixels(), width, height, FilterType::CatmullRom)
        };

        match &self.caption {
            Some(renderer) => renderer.draw(&mut flat, caption, scale),
            None if !caption.trim().is_empty() => {
                tracing::warn!("Caption present but no caption font is available; omitting it");
            }
            None => {}
        }

        let png = encode_png(&flat)?;

        tracing::info!(
            source_width = sw,
            source_height = sh,
            layout_width = lw,
            layout_height = lh,
            width,
            height,
            bytes = png.len(),
            export_ms = started.elapsed().as_millis(),
            "Export complete"
        );

        Ok(RenderedArtifact {
            png,
            width,
            height,
            rendered_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Encode RGBA pixels as PNG with fixed compression settings.
pub fn encode_png(image: &RgbaImage) -> MemeforgeResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Default, PngFilter::Adaptive);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| MemeforgeError::export(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pipeline() -> ExportPipeline {
        ExportPipeline::new(ExportSettings::default(), None)
    }

    fn filled_surface(width: u32, height: u32) -> Surface {
        let mut surface = Surface::with_dimensions(width, height);
        for px in surface.pixels_mut().pixels_mut() {
            *px = Rgba([20, 40, 60, 255]);
        }
        surface
    }

    #[test]
    fn test_layout_size_keeps_small_images() {
        assert_eq!(pipeline().layout_size(400, 300), (400, 300));
        assert_eq!(pipeline().layout_size(600, 900), (600, 900));
    }

    #[test]
    fn test_layout_size_fits_wide_images() {
        assert_eq!(pipeline().layout_size(1200, 800), (600, 400));
        assert_eq!(pipeline().layout_size(4000, 3000), (600, 450));
    }

    #[test]
    fn test_output_size_applies_scale() {
        assert_eq!(pipeline().output_size(400, 300), (800, 600));
        assert_eq!(pipeline().output_size(1200, 800), (1200, 800));
    }

    #[test]
    fn test_nonsensical_scale_falls_back_to_one() {
        let settings = ExportSettings {
            scale: 0.0,
            ..ExportSettings::default()
        };
        let pipeline = ExportPipeline::new(settings, None);
        assert_eq!(pipeline.output_size(400, 300), (400, 300));
    }

    #[test]
    fn test_export_empty_surface_is_refused() {
        let err = pipeline().export(&Surface::new(), "caption").unwrap_err();
        assert!(matches!(err, MemeforgeError::NoBaseImage));
    }

    #[test]
    fn test_export_produces_decodable_png_at_double_size() {
        let artifact = pipeline().export(&filled_surface(400, 300), "").unwrap();
        assert_eq!((artifact.width, artifact.height), (800, 600));

        let decoded = image::load_from_memory(&artifact.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (800, 600));
        let px = decoded.get_pixel(400, 300).0;
        for (actual, expected) in px.iter().zip([20u8, 40, 60, 255]) {
            assert!((*actual as i16 - expected as i16).abs() <= 2, "{px:?}");
        }
    }

    #[test]
    fn test_export_without_font_still_succeeds_with_caption() {
        let artifact = pipeline()
            .export(&filled_surface(10, 10), "Meme in the blockchain forever")
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (20, 20));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = std::env::temp_dir().join("memeforge_test_export_save");
        let _ = std::fs::remove_dir_all(&dir);
        let artifact = pipeline().export(&filled_surface(4, 4), "").unwrap();
        let path = artifact.save(&dir, "nft-with-stickers.png").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), artifact.png);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
