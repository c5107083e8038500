//! Print a random sticker placement set.

use memeforge_common::config::AppConfig;
use memeforge_composition_model::StickerCatalog;
use memeforge_processing_core::PlacementGenerator;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn run(config: &AppConfig, count: Option<usize>, seed: Option<u64>) -> anyhow::Result<()> {
    let catalog = StickerCatalog::from_directory(
        &config.stickers.directory,
        config.stickers.assets.as_slice(),
    );
    let generator = PlacementGenerator::new(count.unwrap_or(config.stickers.count));

    let placements = match seed {
        Some(seed) => generator.generate_with(&catalog, &mut StdRng::seed_from_u64(seed)),
        None => generator.generate(&catalog),
    };

    println!("{}", serde_json::to_string_pretty(&placements)?);
    Ok(())
}
