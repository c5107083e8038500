//! Random sticker placement generation.
//!
//! A generation picks `count` distinct stickers from the catalog by a
//! uniform shuffle-and-take, then samples each sticker's position, size,
//! and rotation independently. Stickers may overlap; nothing prevents it.

use memeforge_composition_model::{
    StickerCatalog, StickerPlacement, POSITION_PERCENT_RANGE, ROTATION_DEG_RANGE, SIZE_PX_RANGE,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Default number of stickers per generation.
pub const DEFAULT_STICKER_COUNT: usize = 3;

/// Produces fresh placement sets.
#[derive(Debug, Clone, Copy)]
pub struct PlacementGenerator {
    count: usize,
}

impl PlacementGenerator {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_STICKER_COUNT)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Generate a placement set using the thread-local RNG.
    pub fn generate(&self, catalog: &StickerCatalog) -> Vec<StickerPlacement> {
        self.generate_with(catalog, &mut rand::rng())
    }

    /// Generate a placement set from an explicit RNG.
    ///
    /// Returns `min(count, catalog.len())` placements, each for a different
    /// asset, in paint order.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        catalog: &StickerCatalog,
        rng: &mut R,
    ) -> Vec<StickerPlacement> {
        let mut assets: Vec<_> = catalog.assets().iter().collect();
        assets.shuffle(rng);
        assets.truncate(self.count);

        let placements: Vec<_> = assets
            .into_iter()
            .map(|asset| {
                StickerPlacement::new(
                    asset.clone(),
                    rng.random_range(POSITION_PERCENT_RANGE),
                    rng.random_range(POSITION_PERCENT_RANGE),
                    rng.random_range(SIZE_PX_RANGE),
                    rng.random_range(ROTATION_DEG_RANGE),
                )
            })
            .collect();

        tracing::debug!(
            requested = self.count,
            catalog = catalog.len(),
            generated = placements.len(),
            "Generated sticker placements"
        );

        placements
    }
}

impl Default for PlacementGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Generate `count` placements from `catalog`.
pub fn generate_placements(catalog: &StickerCatalog, count: usize) -> Vec<StickerPlacement> {
    PlacementGenerator::new(count).generate(catalog)
}
