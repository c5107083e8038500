//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sticker catalog settings.
    pub stickers: StickerConfig,

    /// Export (flattening) settings.
    pub export: ExportSettings,

    /// Caption overlay styling.
    pub caption: CaptionStyle,

    /// Upload service settings.
    pub upload: UploadSettings,

    /// QR code settings.
    pub qr: QrSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Sticker catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    /// Directory containing the sticker PNG assets.
    pub directory: PathBuf,

    /// Asset file names, relative to `directory`, in catalog order.
    pub assets: Vec<String>,

    /// How many stickers a regeneration places.
    pub count: usize,
}

/// Export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Upscaling factor relative to the on-screen layout.
    pub scale: f32,

    /// Maximum on-screen width of the composition, in layout pixels.
    pub layout_max_width: u32,

    /// File name used when the artifact is downloaded.
    pub file_name: String,
}

/// Caption overlay styling, in layout pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// TrueType/OpenType font file. When unset, common system fonts are probed.
    pub font_path: Option<PathBuf>,

    /// Font size.
    pub font_size: f32,

    /// Inner padding of the caption box.
    pub padding: f32,

    /// Distance between the caption box and the bottom edge.
    pub bottom_offset: f32,

    /// Text color as `#rrggbb`.
    pub color: String,

    /// Shadow color as `#rrggbb`.
    pub shadow_color: String,

    /// Shadow offset (x and y).
    pub shadow_offset: f32,

    /// Shadow blur radius.
    pub shadow_blur: f32,
}

/// Which upload failures fall back to a mock transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Every failure produces a mock id.
    #[default]
    AnyError,
    /// Only an unreachable service or an unavailable client produces a mock id.
    ServiceUnavailable,
    /// Failures are always reported.
    Never,
}

/// Upload service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Service base URL. Transaction links are built as `<url>/tx/<id>`.
    pub url: String,

    /// Payment token name passed to the service.
    pub token: String,

    /// Client key passed to the service.
    pub key: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Fallback behaviour on upload failure.
    pub fallback: FallbackPolicy,
}

/// QR code output parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSettings {
    /// Output image width in pixels.
    pub width: u32,

    /// Quiet zone, in modules.
    pub margin: u32,

    /// File name used when the QR code is downloaded.
    pub file_name: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "memeforge=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stickers: StickerConfig::default(),
            export: ExportSettings::default(),
            caption: CaptionStyle::default(),
            upload: UploadSettings::default(),
            qr: QrSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("public").join("stickers"),
            assets: (1..=13).map(|i| format!("irys{i}.png")).collect(),
            count: 3,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            layout_max_width: 600,
            file_name: "nft-with-stickers.png".to_string(),
        }
    }
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 24.0,
            padding: 10.0,
            bottom_offset: 20.0,
            color: "#ffffff".to_string(),
            shadow_color: "#000000".to_string(),
            shadow_offset: 2.0,
            shadow_blur: 4.0,
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            url: "https://devnet.irys.xyz".to_string(),
            token: "matic".to_string(),
            key: "test-key".to_string(),
            timeout_secs: 30,
            fallback: FallbackPolicy::AnyError,
        }
    }
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            width: 200,
            margin: 2,
            file_name: "meme-qr-code.png".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Full paths of every catalog asset, in catalog order.
    pub fn sticker_paths(&self) -> Vec<PathBuf> {
        self.stickers
            .assets
            .iter()
            .map(|name| self.stickers.directory.join(name))
            .collect()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("memeforge").join("config.json")
}
