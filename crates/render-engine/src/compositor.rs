//! Layered compositor: base image plus rotated sticker overlays.
//!
//! Every sticker asset is loaded before anything is painted, and stickers
//! are then painted strictly in placement order. Final stacking therefore
//! never depends on which asset finished loading first.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use memeforge_common::error::{MemeforgeError, MemeforgeResult};
use memeforge_composition_model::{BaseImage, StickerPlacement};

use crate::assets::AssetSource;
use crate::surface::Surface;

/// Outcome of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Number of stickers painted.
    pub painted: usize,

    /// Ids of stickers whose asset failed to load, in placement order.
    pub skipped: Vec<String>,
}

/// Paints base image and stickers onto a surface.
#[derive(Clone)]
pub struct Compositor {
    source: Arc<dyn AssetSource>,
}

impl Compositor {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Repaint `surface` from scratch.
    ///
    /// The surface must already have the base image's natural dimensions.
    /// Stickers whose asset cannot be loaded are skipped without error.
    pub async fn render(
        &self,
        surface: &mut Surface,
        base: &BaseImage,
        placements: &[StickerPlacement],
    ) -> MemeforgeResult<RenderReport> {
        if surface.dimensions() != base.natural_dimensions() {
            let (sw, sh) = surface.dimensions();
            let (bw, bh) = base.natural_dimensions();
            return Err(MemeforgeError::render(format!(
                "surface is {sw}x{sh} but base image is {bw}x{bh}"
            )));
        }

        let loaded =
            futures::future::join_all(placements.iter().map(|p| self.source.load(p.asset())))
                .await;

        surface.clear();
        draw_base(surface.pixels_mut(), base.pixels());

        let mut report = RenderReport::default();
        for (placement, sticker) in placements.iter().zip(loaded) {
            match sticker {
                Ok(sticker) => {
                    paint_sticker(surface.pixels_mut(), &sticker, placement);
                    report.painted += 1;
                    tracing::debug!(
                        sticker = %placement.asset().id,
                        x_percent = placement.x_percent(),
                        y_percent = placement.y_percent(),
                        size_px = placement.size_px(),
                        rotation_deg = placement.rotation_deg(),
                        "Painted sticker"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        sticker = %placement.asset().id,
                        error = %e,
                        "Skipping sticker that failed to load"
                    );
                    report.skipped.push(placement.asset().id.clone());
                }
            }
        }

        tracing::info!(
            width = surface.width(),
            height = surface.height(),
            painted = report.painted,
            skipped = report.skipped.len(),
            source = self.source.name(),
            "Composition rendered"
        );

        Ok(report)
    }
}

/// Draw `base` stretched to exactly cover `canvas`.
fn draw_base(canvas: &mut RgbaImage, base: &RgbaImage) {
    if canvas.dimensions() == base.dimensions() {
        imageops::overlay(canvas, base, 0, 0);
    } else {
        let (w, h) = canvas.dimensions();
        let scaled = imageops::resize(base, w, h, FilterType::Triangle);
        imageops::overlay(canvas, &scaled, 0, 0);
    }
}

/// Paint one sticker centred on its placement point.
///
/// The sticker is scaled and rotated inside its own padded layer, so the
/// transform only ever touches that layer before it is blended down.
fn paint_sticker(canvas: &mut RgbaImage, sticker: &RgbaImage, placement: &StickerPlacement) {
    let (width, height) = canvas.dimensions();
    let (cx, cy) = placement.center_px(width, height);
    let size = placement.size_px().round().max(1.0) as u32;

    let scaled = imageops::resize(sticker, size, size, FilterType::Triangle);

    // Room for the rotated square's corners.
    let pad = ((size as f64) * (std::f64::consts::SQRT_2 - 1.0) / 2.0).ceil() as u32 + 1;
    let side = size + 2 * pad;
    let mut layer = RgbaImage::new(side, side);
    imageops::overlay(&mut layer, &scaled, pad as i64, pad as i64);

    let layer = if placement.rotation_deg() == 0.0 {
        layer
    } else {
        rotate_about_center(
            &layer,
            placement.rotation_rad() as f32,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
        )
    };

    let x = (cx - side as f64 / 2.0).round() as i64;
    let y = (cy - side as f64 / 2.0).round() as i64;
    imageops::overlay(canvas, &layer, x, y);
}
