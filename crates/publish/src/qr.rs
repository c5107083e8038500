//! QR code rendering.
//!
//! Modules are painted onto a grayscale canvas by hand, with a white quiet
//! zone, then nearest-neighbour scaled to the exact requested width. A
//! width too small to give every module a pixel is ignored and the symbol
//! is emitted at one pixel per module.

use std::path::{Path, PathBuf};

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use memeforge_common::config::QrSettings;
use memeforge_common::error::{MemeforgeError, MemeforgeResult};
use qrcode::{Color, QrCode};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Output width and height in pixels.
    pub width: u32,
    /// Quiet zone, in modules.
    pub margin: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self::from(&QrSettings::default())
    }
}

impl From<&QrSettings> for QrOptions {
    fn from(settings: &QrSettings) -> Self {
        Self {
            width: settings.width,
            margin: settings.margin,
        }
    }
}

/// An encoded QR image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    /// The encoded text.
    pub text: String,
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Pixel width (and height).
    pub width: u32,
    /// Modules per side, excluding the quiet zone.
    pub modules: u32,
}

impl QrImage {
    /// `data:image/png;base64,...` form for embedding.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }

    pub fn save(&self, dir: &Path, file_name: &str) -> MemeforgeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, &self.png)?;
        tracing::info!(path = %path.display(), "Saved QR code");
        Ok(path)
    }
}

/// Encode `text` as a square QR PNG.
pub fn encode_qr(text: &str, options: QrOptions) -> MemeforgeResult<QrImage> {
    if options.width == 0 {
        return Err(MemeforgeError::qr("QR width must be positive"));
    }
    let code =
        QrCode::new(text.as_bytes()).map_err(|e| MemeforgeError::qr(format!("{e}")))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let total = modules + 2 * options.margin;
    let module_px = (options.width / total).max(1);
    let canvas_side = total * module_px;

    let mut canvas = GrayImage::from_pixel(canvas_side, canvas_side, LIGHT);
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = (i as u32 % modules) + options.margin;
        let my = (i as u32 / modules) + options.margin;
        for dy in 0..module_px {
            for dx in 0..module_px {
                canvas.put_pixel(mx * module_px + dx, my * module_px + dy, DARK);
            }
        }
    }

    if options.width < total {
        tracing::warn!(
            requested = options.width,
            width = canvas_side,
            "QR width too small for symbol; using one pixel per module"
        );
    } else if canvas_side != options.width {
        canvas = imageops::resize(&canvas, options.width, options.width, FilterType::Nearest);
    }
    let width = canvas.width();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::L8,
        )
        .map_err(|e| MemeforgeError::qr(format!("PNG encoding failed: {e}")))?;

    tracing::debug!(modules, width, "Encoded QR code");
    Ok(QrImage {
        text: text.to_string(),
        png,
        width,
        modules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(qr: &QrImage) -> GrayImage {
        image::load_from_memory(&qr.png).unwrap().to_luma8()
    }

    #[test]
    fn test_default_options() {
        assert_eq!(
            QrOptions::default(),
            QrOptions {
                width: 200,
                margin: 2
            }
        );
    }

    #[test]
    fn test_exact_width() {
        let qr = encode_qr("https://devnet.irys.xyz/tx/abc", QrOptions::default()).unwrap();
        let img = decode(&qr);
        assert_eq!(img.dimensions(), (200, 200));
    }

    #[test]
    fn test_quiet_zone_and_finder_pattern() {
        let qr = encode_qr("https://devnet.irys.xyz/tx/abc", QrOptions::default()).unwrap();
        let img = decode(&qr);
        let module_px = 200.0 / (qr.modules + 4) as f32;
        assert_eq!(img.get_pixel(0, 0).0, [255]);
        // Outer ring of the top-left finder pattern sits right after the margin.
        let p = (2.5 * module_px) as u32;
        assert_eq!(img.get_pixel(p, p).0, [0]);
    }

    #[test]
    fn test_too_small_width_keeps_every_module() {
        let link = format!("https://devnet.irys.xyz/tx/{}", "ab".repeat(32));
        let qr = encode_qr(&link, QrOptions { width: 30, margin: 2 }).unwrap();
        let img = decode(&qr);
        let side = qr.modules + 4;
        assert_eq!(img.dimensions(), (side, side));
        assert_eq!(qr.width, side);
        // One pixel per module: the finder pattern's outer ring starts at the margin.
        assert_eq!(img.get_pixel(1, 1).0, [255]);
        assert_eq!(img.get_pixel(2, 2).0, [0]);
        assert_eq!(img.get_pixel(2, 8).0, [0]);
        assert_eq!(img.get_pixel(3, 3).0, [255]);
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = encode_qr("x", QrOptions { width: 0, margin: 2 }).unwrap_err();
        assert!(matches!(err, MemeforgeError::Qr { .. }));
    }

    #[test]
    fn test_data_url_prefix() {
        let qr = encode_qr("hello", QrOptions::default()).unwrap();
        assert!(qr.to_data_url().starts_with("data:image/png;base64,iVBOR"));
    }
}
