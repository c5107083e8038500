//! List sticker catalog assets.

use memeforge_common::config::AppConfig;
use memeforge_composition_model::StickerCatalog;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = StickerCatalog::from_directory(
        &config.stickers.directory,
        config.stickers.assets.as_slice(),
    );

    println!("Sticker catalog: {}", config.stickers.directory.display());
    println!("{}", "=".repeat(50));

    let mut missing = 0;
    for asset in catalog.assets() {
        if asset.path.exists() {
            println!("[OK]   {} ({})", asset.id, asset.path.display());
        } else {
            missing += 1;
            println!("[MISS] {} ({})", asset.id, asset.path.display());
        }
    }

    println!();
    if missing == 0 {
        println!("All {} stickers are available.", catalog.len());
    } else {
        println!(
            "{missing} of {} stickers are missing; they will be skipped when composing.",
            catalog.len()
        );
    }
    Ok(())
}
