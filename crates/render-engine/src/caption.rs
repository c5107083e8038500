//! Caption overlay.
//!
//! The caption is a separate layer from the sticker surface: a centred,
//! word-wrapped line block anchored above the bottom edge, drawn over a
//! blurred drop shadow. All style lengths are layout pixels and are
//! multiplied by the export scale at draw time.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;
use memeforge_common::config::CaptionStyle;
use memeforge_common::error::{MemeforgeError, MemeforgeResult};
use rusttype::{point, Font, Scale};

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.15;

/// Font files probed when no font is configured, bold faces first.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws caption text with its shadow onto a raster.
pub struct CaptionRenderer {
    font: Font<'static>,
    font_size: f32,
    padding: f32,
    bottom_offset: f32,
    color: Rgba<u8>,
    shadow_color: Rgba<u8>,
    shadow_offset: f32,
    shadow_blur: f32,
}

impl std::fmt::Debug for CaptionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionRenderer")
            .field("font_size", &self.font_size)
            .field("padding", &self.padding)
            .field("bottom_offset", &self.bottom_offset)
            .finish_non_exhaustive()
    }
}

impl CaptionRenderer {
    /// Build a renderer from raw TrueType/OpenType bytes.
    pub fn from_font_bytes(bytes: Vec<u8>, style: &CaptionStyle) -> MemeforgeResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| MemeforgeError::config("caption font could not be parsed"))?;
        Self::with_font(font, style)
    }

    fn with_font(font: Font<'static>, style: &CaptionStyle) -> MemeforgeResult<Self> {
        Ok(Self {
            font,
            font_size: style.font_size.max(1.0),
            padding: style.padding.max(0.0),
            bottom_offset: style.bottom_offset.max(0.0),
            color: parse_hex_color(&style.color)?,
            shadow_color: parse_hex_color(&style.shadow_color)?,
            shadow_offset: style.shadow_offset,
            shadow_blur: style.shadow_blur.max(0.0),
        })
    }

    /// Load the configured font, or probe common system fonts.
    ///
    /// A configured font that cannot be read is an error. A system font that
    /// is missing, unreadable or unparsable yields `Ok(None)`.
    pub fn load(style: &CaptionStyle) -> MemeforgeResult<Option<Self>> {
        if let Some(path) = &style.font_path {
            let bytes = std::fs::read(path).map_err(|e| {
                MemeforgeError::config(format!("caption font {}: {e}", path.display()))
            })?;
            return Self::from_font_bytes(bytes, style).map(Some);
        }

        match find_system_font() {
            Some(path) => Self::load_system_font(&path, style),
            None => {
                tracing::warn!("No caption font found; captions will not be rendered");
                Ok(None)
            }
        }
    }

    fn load_system_font(path: &Path, style: &CaptionStyle) -> MemeforgeResult<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    font = %path.display(),
                    error = %e,
                    "System caption font unreadable; captions will not be rendered"
                );
                return Ok(None);
            }
        };
        let Some(font) = Font::try_from_vec(bytes) else {
            tracing::warn!(
                font = %path.display(),
                "System caption font could not be parsed; captions will not be rendered"
            );
            return Ok(None);
        };
        tracing::debug!(font = %path.display(), "Using system caption font");
        Self::with_font(font, style).map(Some)
    }

    /// Width in pixels of `text` set at `px`.
    pub fn text_width(&self, text: &str, px: f32) -> f32 {
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        self.font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0, f32::max)
    }

    /// Greedy word wrap. A single word wider than `max_width` keeps its own line.
    pub fn wrap_lines(&self, text: &str, px: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if self.text_width(&candidate, px) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Draw `text` onto `canvas` with every style length multiplied by `scale`.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str, scale: f32) {
        if text.trim().is_empty() || canvas.width() == 0 || canvas.height() == 0 {
            return;
        }

        let (width, height) = canvas.dimensions();
        let px = self.font_size * scale;
        let padding = self.padding * scale;
        let line_height = px * LINE_HEIGHT;

        let lines = self.wrap_lines(text, px, (width as f32 - 2.0 * padding).max(px));
        let block_height = lines.len() as f32 * line_height + 2.0 * padding;
        let top = height as f32 - self.bottom_offset * scale - block_height;

        let rt_scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(rt_scale);
        let half_leading = (line_height - (v_metrics.ascent - v_metrics.descent)) / 2.0;

        let mut mask = GrayImage::new(width, height);
        for (i, line) in lines.iter().enumerate() {
            let line_width = self.text_width(line, px);
            let x = (width as f32 - line_width) / 2.0;
            let baseline = top + padding + i as f32 * line_height + half_leading + v_metrics.ascent;
            rasterize_line(&self.font, &mut mask, line, rt_scale, x, baseline);
        }

        let sigma = self.shadow_blur * scale / 2.0;
        let shadow = if sigma > 0.0 {
            gaussian_blur_f32(&mask, sigma)
        } else {
            mask.clone()
        };
        let offset = (self.shadow_offset * scale).round() as i64;
        blend_mask(canvas, &shadow, offset, offset, self.shadow_color);
        blend_mask(canvas, &mask, 0, 0, self.color);

        tracing::debug!(lines = lines.len(), px, "Caption drawn");
    }
}

/// First readable font among the probe candidates.
pub fn find_system_font() -> Option<PathBuf> {
    FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|path| path.is_file())
        .map(Path::to_path_buf)
}

fn rasterize_line(
    font: &Font<'static>,
    mask: &mut GrayImage,
    text: &str,
    scale: Scale,
    x: f32,
    baseline: f32,
) {
    let (width, height) = mask.dimensions();
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bb.min.x;
            let py = gy as i32 + bb.min.y;
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            let value = (coverage * 255.0).round() as u8;
            let dst = mask.get_pixel_mut(px as u32, py as u32);
            dst.0[0] = dst.0[0].max(value);
        });
    }
}

/// Source-over blend of a solid `color` through `mask`, shifted by `(dx, dy)`.
fn blend_mask(canvas: &mut RgbaImage, mask: &GrayImage, dx: i64, dy: i64, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let color_alpha = color.0[3] as f32 / 255.0;
    for (mx, my, Luma([coverage])) in mask.enumerate_pixels() {
        if *coverage == 0 {
            continue;
        }
        let x = mx as i64 + dx;
        let y = my as i64 + dy;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            continue;
        }
        let a = *coverage as f32 / 255.0 * color_alpha;
        let inv = 1.0 - a;
        let dst = canvas.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
        }
        dst.0[3] = (255.0 * a + dst.0[3] as f32 * inv).round() as u8;
    }
}

/// Parse `#rrggbb` (or `#rrggbbaa`) into an RGBA pixel.
fn parse_hex_color(s: &str) -> MemeforgeResult<Rgba<u8>> {
    let hex = s.trim().trim_start_matches('#');
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| MemeforgeError::config(format!("invalid color: {s}")))
    };
    match hex.len() {
        6 if hex.is_ascii() => Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 if hex.is_ascii() => Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => Err(MemeforgeError::config(format!("invalid color: {s}"))),
    }
}
