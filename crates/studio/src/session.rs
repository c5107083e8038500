//! The editing session.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use memeforge_common::config::AppConfig;
use memeforge_common::error::{MemeforgeError, MemeforgeResult};
use memeforge_composition_model::{
    BaseImage, CompositionError, CompositionState, StickerCatalog, StickerPlacement,
};
use memeforge_processing_core::{random_phrase, PlacementGenerator};
use memeforge_publish::{ClientHandle, ClientStatus, PublishResult, Publisher};
use memeforge_render_engine::{
    CaptionRenderer, Compositor, ExportPipeline, FsAssetSource, RenderReport, RenderedArtifact,
    Surface,
};
use rand::Rng;
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::gate::ActionGate;

const DEFAULT_QR_FILE_NAME: &str = "meme-qr-code.png";

fn composition_error(err: CompositionError) -> MemeforgeError {
    match err {
        CompositionError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
            MemeforgeError::FileNotFound { path }
        }
        CompositionError::Io { source, .. } => MemeforgeError::Io(source),
        CompositionError::UnsupportedMedia { message } => MemeforgeError::unsupported_media(message),
        CompositionError::Decode { message } => MemeforgeError::decode(message),
    }
}

/// A single editing session.
///
/// Lock order is always `state` before `surface`.
pub struct Studio {
    state: RwLock<CompositionState>,
    surface: AsyncMutex<Surface>,
    compositor: Compositor,
    export: ExportPipeline,
    publisher: Publisher,
    catalog: StickerCatalog,
    generator: PlacementGenerator,
    gate: ActionGate,
    last_publish: Mutex<Option<PublishResult>>,
    qr_file_name: String,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("assets", &self.compositor.source_name())
            .field("catalog", &self.catalog.len())
            .field("generator", &self.generator)
            .field("busy", &self.gate.current())
            .finish()
    }
}

impl Studio {
    pub fn new(
        catalog: StickerCatalog,
        compositor: Compositor,
        export: ExportPipeline,
        publisher: Publisher,
    ) -> Self {
        Self {
            state: RwLock::new(CompositionState::new()),
            surface: AsyncMutex::new(Surface::new()),
            compositor,
            export,
            publisher,
            catalog,
            generator: PlacementGenerator::with_defaults(),
            gate: ActionGate::new(),
            last_publish: Mutex::new(None),
            qr_file_name: DEFAULT_QR_FILE_NAME.to_string(),
        }
    }

    /// Build a session from configuration.
    ///
    /// `handle` may still be initializing; uploads attempted before it is
    /// ready follow the configured fallback policy.
    pub fn from_config(config: &AppConfig, handle: ClientHandle) -> MemeforgeResult<Self> {
        let catalog = StickerCatalog::from_directory(
            &config.stickers.directory,
            config.stickers.assets.as_slice(),
        );
        let compositor = Compositor::new(Arc::new(FsAssetSource::new()));
        let caption = CaptionRenderer::load(&config.caption)?;
        let export = ExportPipeline::new(config.export.clone(), caption);

        let publisher = Publisher::new(handle, &config.upload, &config.qr);

        tracing::info!(
            stickers = catalog.len(),
            sticker_dir = %config.stickers.directory.display(),
            upload_url = %config.upload.url,
            "Studio session created"
        );

        Ok(Self::new(catalog, compositor, export, publisher)
            .with_generator(PlacementGenerator::new(config.stickers.count))
            .with_qr_file_name(config.qr.file_name.clone()))
    }

    pub fn with_generator(mut self, generator: PlacementGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_qr_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.qr_file_name = file_name.into();
        self
    }

    pub fn catalog(&self) -> &StickerCatalog {
        &self.catalog
    }

    pub fn client_status(&self) -> ClientStatus {
        self.publisher.handle().status()
    }

    pub async fn has_base_image(&self) -> bool {
        self.state.read().await.has_base_image()
    }

    pub async fn caption(&self) -> String {
        self.state.read().await.caption().to_string()
    }

    pub async fn placements(&self) -> Vec<StickerPlacement> {
        self.state.read().await.placements().to_vec()
    }

    pub async fn surface_dimensions(&self) -> (u32, u32) {
        self.surface.lock().await.dimensions()
    }

    /// Copy of the current surface pixels.
    pub async fn snapshot(&self) -> Surface {
        self.surface.lock().await.clone()
    }

    /// The result of the most recent successful publish.
    pub fn last_publish(&self) -> Option<PublishResult> {
        self.last_publish
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Decode `bytes` and make them the base image.
    ///
    /// The surface is resized to the image's natural dimensions, existing
    /// stickers are dropped, and an empty caption gets a random phrase.
    pub async fn load_image_bytes(&self, bytes: Vec<u8>) -> MemeforgeResult<RenderReport> {
        let image = tokio::task::spawn_blocking(move || BaseImage::from_bytes(&bytes))
            .await
            .map_err(|e| MemeforgeError::decode(format!("decode task failed: {e}")))?
            .map_err(composition_error)?;
        self.install_base_image(image).await
    }

    pub async fn load_image_path(&self, path: impl AsRef<Path>) -> MemeforgeResult<RenderReport> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MemeforgeError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Loading image");
        self.load_image_bytes(bytes).await
    }

    async fn install_base_image(&self, image: BaseImage) -> MemeforgeResult<RenderReport> {
        let (width, height) = image.natural_dimensions();
        let mut state = self.state.write().await;
        state.load_base_image(image);
        if state.caption().is_empty() {
            state.set_caption(random_phrase());
        }

        let mut surface = self.surface.lock().await;
        surface.resize(width, height);
        tracing::info!(
            width,
            height,
            mime = state.base_image().map(|b| b.mime_type()),
            "Base image loaded"
        );

        match state.base_image() {
            Some(base) => {
                self.compositor
                    .render(&mut surface, base, state.placements())
                    .await
            }
            None => Err(MemeforgeError::NoBaseImage),
        }
    }

    /// Replace the caption. Stickers are untouched.
    pub async fn set_caption(&self, caption: impl Into<String>) -> MemeforgeResult<()> {
        let mut state = self.state.write().await;
        if !state.has_base_image() {
            return Err(MemeforgeError::NoBaseImage);
        }
        state.set_caption(caption);
        Ok(())
    }

    /// Replace the caption with a random phrase and return it.
    pub async fn randomize_caption(&self) -> MemeforgeResult<String> {
        let phrase = random_phrase();
        self.set_caption(phrase).await?;
        Ok(phrase.to_string())
    }

    /// Replace the sticker set with a fresh random one and repaint.
    pub async fn regenerate_stickers(&self) -> MemeforgeResult<RenderReport> {
        let placements = self.generator.generate(&self.catalog);
        self.replace_placements(placements).await
    }

    /// [`Self::regenerate_stickers`] with a caller-supplied RNG.
    pub async fn regenerate_stickers_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> MemeforgeResult<RenderReport> {
        let placements = self.generator.generate_with(&self.catalog, rng);
        self.replace_placements(placements).await
    }

    /// Install `placements` as the whole sticker set and repaint.
    pub async fn replace_placements(
        &self,
        placements: Vec<StickerPlacement>,
    ) -> MemeforgeResult<RenderReport> {
        let mut state = self.state.write().await;
        if !state.has_base_image() {
            return Err(MemeforgeError::NoBaseImage);
        }
        state.replace_placements(placements);

        let mut surface = self.surface.lock().await;
        let base = state.base_image().ok_or(MemeforgeError::NoBaseImage)?;
        let report = self
            .compositor
            .render(&mut surface, base, state.placements())
            .await?;
        tracing::info!(
            painted = report.painted,
            skipped = report.skipped.len(),
            "Stickers regenerated"
        );
        Ok(report)
    }

    /// Flatten the composition into a PNG artifact.
    pub async fn export(&self) -> MemeforgeResult<RenderedArtifact> {
        let _ticket = self.gate.try_begin("export")?;
        self.render_artifact().await
    }

    /// Export and write the artifact into `dir`.
    pub async fn download(&self, dir: &Path) -> MemeforgeResult<PathBuf> {
        let _ticket = self.gate.try_begin("export")?;
        let artifact = self.render_artifact().await?;
        artifact.save(dir, &self.export.settings().file_name)
    }

    async fn render_artifact(&self) -> MemeforgeResult<RenderedArtifact> {
        let (surface, caption) = {
            let state = self.state.read().await;
            if !state.has_base_image() {
                return Err(MemeforgeError::NoBaseImage);
            }
            let surface = self.surface.lock().await.clone();
            (surface, state.caption().to_string())
        };

        let pipeline = self.export.clone();
        tokio::task::spawn_blocking(move || pipeline.export(&surface, &caption))
            .await
            .map_err(|e| MemeforgeError::export(format!("export task failed: {e}")))?
    }

    /// Export, upload, and keep the resulting link and QR.
    ///
    /// The previous result is cleared first, so a failed publish leaves
    /// nothing behind.
    pub async fn publish(&self) -> MemeforgeResult<PublishResult> {
        let _ticket = self.gate.try_begin("upload")?;
        *self.last_publish.lock().unwrap_or_else(|e| e.into_inner()) = None;

        let artifact = self.render_artifact().await?;
        let result = self.publisher.publish(&artifact.png).await?;
        if let Some(notice) = &result.notice {
            tracing::warn!(notice = %notice, "Published with placeholder id");
        }

        *self.last_publish.lock().unwrap_or_else(|e| e.into_inner()) = Some(result.clone());
        Ok(result)
    }

    /// Write the last QR code into `dir`. `Ok(None)` if nothing has been
    /// published yet.
    pub fn download_qr(&self, dir: &Path) -> MemeforgeResult<Option<PathBuf>> {
        match self.last_publish() {
            Some(result) => result.qr.save(dir, &self.qr_file_name).map(Some),
            None => {
                tracing::info!("No QR code to download");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use memeforge_common::config::{ExportSettings, UploadSettings};
    use memeforge_render_engine::MemoryAssetSource;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn studio() -> Studio {
        let catalog = StickerCatalog::from_directory(Path::new("stickers"), &["a.png", "b.png"]);
        let source = MemoryAssetSource::new()
            .with("a", RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])))
            .with("b", RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])));
        Studio::new(
            catalog,
            Compositor::new(Arc::new(source)),
            ExportPipeline::new(ExportSettings::default(), None),
            Publisher::new(
                ClientHandle::new(),
                &UploadSettings::default(),
                &Default::default(),
            ),
        )
    }

    #[tokio::test]
    async fn test_load_sizes_surface_and_sets_caption() {
        let studio = studio();
        studio.load_image_bytes(png(320, 240)).await.unwrap();
        assert_eq!(studio.surface_dimensions().await, (320, 240));
        let caption = studio.caption().await;
        assert!(memeforge_processing_core::phrases::PHRASES.contains(&caption.as_str()));
    }

    #[tokio::test]
    async fn test_load_keeps_existing_caption_and_clears_stickers() {
        let studio = studio();
        studio.load_image_bytes(png(320, 240)).await.unwrap();
        studio.set_caption("mine").await.unwrap();
        studio.regenerate_stickers().await.unwrap();
        assert_eq!(studio.placements().await.len(), 2);

        studio.load_image_bytes(png(100, 50)).await.unwrap();
        assert_eq!(studio.caption().await, "mine");
        assert!(studio.placements().await.is_empty());
        assert_eq!(studio.surface_dimensions().await, (100, 50));
    }

    #[tokio::test]
    async fn test_actions_need_an_image() {
        let studio = studio();
        assert!(matches!(
            studio.set_caption("x").await,
            Err(MemeforgeError::NoBaseImage)
        ));
        assert!(matches!(
            studio.randomize_caption().await,
            Err(MemeforgeError::NoBaseImage)
        ));
        assert!(matches!(
            studio.regenerate_stickers().await,
            Err(MemeforgeError::NoBaseImage)
        ));
        assert!(matches!(
            studio.publish().await,
            Err(MemeforgeError::NoBaseImage)
        ));
    }

    #[tokio::test]
    async fn test_non_image_is_unsupported() {
        let studio = studio();
        let err = studio
            .load_image_bytes(b"plain text".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, MemeforgeError::UnsupportedMedia { .. }));
        assert!(!studio.has_base_image().await);
    }

    #[tokio::test]
    async fn test_missing_path_is_reported() {
        let err = studio()
            .load_image_path("/no/such/image.png")
            .await
            .unwrap_err();
        assert!(matches!(err, MemeforgeError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_download_qr_without_publish_is_none() {
        let dir = std::env::temp_dir().join("memeforge_test_studio_qr_none");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(studio().download_qr(&dir).unwrap().is_none());
        assert!(!dir.join(DEFAULT_QR_FILE_NAME).exists());
    }
}
