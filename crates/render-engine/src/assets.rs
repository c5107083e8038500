//! Sticker asset sources.

use std::collections::HashMap;

use image::RgbaImage;
use memeforge_common::error::{MemeforgeError, MemeforgeResult};
use memeforge_composition_model::StickerAsset;

/// Abstract interface for loading sticker pixels.
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    /// Load and decode one sticker.
    async fn load(&self, asset: &StickerAsset) -> MemeforgeResult<RgbaImage>;

    /// Source name, for logging.
    fn name(&self) -> &str;
}

/// Reads sticker PNGs from disk, decoding on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct FsAssetSource;

impl FsAssetSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AssetSource for FsAssetSource {
    async fn load(&self, asset: &StickerAsset) -> MemeforgeResult<RgbaImage> {
        let bytes = match tokio::fs::read(&asset.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MemeforgeError::FileNotFound {
                    path: asset.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let id = asset.id.clone();
        tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes)
                .map(|img| img.to_rgba8())
                .map_err(|e| MemeforgeError::decode(format!("sticker {id}: {e}")))
        })
        .await
        .map_err(|e| MemeforgeError::decode(format!("sticker decode task failed: {e}")))?
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

/// Serves stickers from memory, keyed by asset id.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    images: HashMap<String, RgbaImage>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, image: RgbaImage) {
        self.images.insert(id.into(), image);
    }

    pub fn with(mut self, id: impl Into<String>, image: RgbaImage) -> Self {
        self.insert(id, image);
        self
    }
}

#[async_trait::async_trait]
impl AssetSource for MemoryAssetSource {
    async fn load(&self, asset: &StickerAsset) -> MemeforgeResult<RgbaImage> {
        self.images
            .get(&asset.id)
            .cloned()
            .ok_or_else(|| MemeforgeError::FileNotFound {
                path: asset.path.clone(),
            })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn test_fs_source_reports_missing_file() {
        let asset = StickerAsset::new("ghost", "/definitely/not/here/ghost.png");
        let err = FsAssetSource::new().load(&asset).await.unwrap_err();
        assert!(matches!(err, MemeforgeError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fs_source_decodes_png() {
        let dir = std::env::temp_dir().join("memeforge_test_fs_assets");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dot.png");
        RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255]))
            .save(&path)
            .unwrap();

        let img = FsAssetSource::new()
            .load(&StickerAsset::from_path(&path))
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [9, 8, 7, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_fs_source_rejects_garbage() {
        let dir = std::env::temp_dir().join("memeforge_test_fs_assets_garbage");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = FsAssetSource::new()
            .load(&StickerAsset::from_path(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, MemeforgeError::Decode { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_memory_source_lookup() {
        let source = MemoryAssetSource::new().with("irys1", RgbaImage::new(2, 2));
        let hit = source.load(&StickerAsset::new("irys1", "irys1.png")).await;
        assert!(hit.is_ok());
        let miss = source.load(&StickerAsset::new("irys2", "irys2.png")).await;
        assert!(miss.is_err());
    }
}
