//! The sticker catalog.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque handle to one sticker image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StickerAsset {
    /// Stable identifier (the asset file stem, e.g. `irys4`).
    pub id: String,

    /// Location of the PNG on disk.
    pub path: PathBuf,
}

impl StickerAsset {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Build an asset whose id is derived from the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { id, path }
    }
}

/// Fixed, ordered list of sticker assets.
///
/// The catalog is only ever read; placement generation samples from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerCatalog {
    assets: Vec<StickerAsset>,
}

impl StickerCatalog {
    pub fn new(assets: Vec<StickerAsset>) -> Self {
        Self { assets }
    }

    /// Catalog of `names` resolved against `directory`.
    pub fn from_directory<S: AsRef<str>>(directory: &Path, names: &[S]) -> Self {
        Self {
            assets: names
                .iter()
                .map(|name| StickerAsset::from_path(directory.join(name.as_ref())))
                .collect(),
        }
    }

    pub fn assets(&self) -> &[StickerAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StickerAsset> {
        self.assets.iter().find(|asset| asset.id == id)
    }
}
