//! Sticker placement records.
//!
//! A placement is immutable once built. Coordinates are percentages of the
//! surface dimensions; size is in surface pixels; rotation is in degrees,
//! clockwise on a y-down raster.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::catalog::StickerAsset;

/// Valid range for `x_percent` and `y_percent`.
pub const POSITION_PERCENT_RANGE: RangeInclusive<f64> = 15.0..=85.0;

/// Valid range for `size_px`.
pub const SIZE_PX_RANGE: RangeInclusive<f64> = 120.0..=240.0;

/// Valid range for `rotation_deg`.
pub const ROTATION_DEG_RANGE: RangeInclusive<f64> = -15.0..=15.0;

/// Position, size, and rotation of one sticker instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerPlacement {
    asset: StickerAsset,
    x_percent: f64,
    y_percent: f64,
    size_px: f64,
    rotation_deg: f64,
}

impl StickerPlacement {
    /// Create a placement, clamping every value into its valid range.
    pub fn new(
        asset: StickerAsset,
        x_percent: f64,
        y_percent: f64,
        size_px: f64,
        rotation_deg: f64,
    ) -> Self {
        Self {
            asset,
            x_percent: clamp_to(x_percent, &POSITION_PERCENT_RANGE),
            y_percent: clamp_to(y_percent, &POSITION_PERCENT_RANGE),
            size_px: clamp_to(size_px, &SIZE_PX_RANGE),
            rotation_deg: clamp_to(rotation_deg, &ROTATION_DEG_RANGE),
        }
    }

    pub fn asset(&self) -> &StickerAsset {
        &self.asset
    }

    pub fn x_percent(&self) -> f64 {
        self.x_percent
    }

    pub fn y_percent(&self) -> f64 {
        self.y_percent
    }

    pub fn size_px(&self) -> f64 {
        self.size_px
    }

    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }

    /// Sticker centre in pixel coordinates of a `width` x `height` surface.
    pub fn center_px(&self, width: u32, height: u32) -> (f64, f64) {
        (
            width as f64 * self.x_percent / 100.0,
            height as f64 * self.y_percent / 100.0,
        )
    }

    /// Whether every value sits inside its valid range.
    pub fn is_within_bounds(&self) -> bool {
        POSITION_PERCENT_RANGE.contains(&self.x_percent)
            && POSITION_PERCENT_RANGE.contains(&self.y_percent)
            && SIZE_PX_RANGE.contains(&self.size_px)
            && ROTATION_DEG_RANGE.contains(&self.rotation_deg)
    }
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}
