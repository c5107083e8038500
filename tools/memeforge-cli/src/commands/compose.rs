//! Compose, export, and optionally publish a meme.

use std::path::PathBuf;

use memeforge_common::config::AppConfig;
use memeforge_publish::{ClientHandle, ClientStatus};
use memeforge_studio::Studio;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct ComposeOptions {
    pub image: PathBuf,
    pub caption: Option<String>,
    pub random_caption: bool,
    pub stickers: Option<usize>,
    pub stickers_dir: Option<PathBuf>,
    pub output: PathBuf,
    pub upload: bool,
    pub seed: Option<u64>,
}

pub async fn run(mut config: AppConfig, options: ComposeOptions) -> anyhow::Result<()> {
    if let Some(count) = options.stickers {
        config.stickers.count = count;
    }
    if let Some(dir) = options.stickers_dir {
        config.stickers.directory = dir;
    }

    let handle = ClientHandle::new();
    let init = options
        .upload
        .then(|| handle.spawn_http_init(config.upload.clone()));
    let studio = Studio::from_config(&config, handle)?;

    println!("Composing: {}", options.image.display());
    studio.load_image_path(&options.image).await?;
    let (width, height) = studio.surface_dimensions().await;
    println!("  Image: {width}x{height}");

    if let Some(caption) = options.caption {
        studio.set_caption(caption).await?;
    } else if options.random_caption {
        studio.randomize_caption().await?;
    }
    println!("  Caption: {}", studio.caption().await);

    let report = match options.seed {
        Some(seed) => {
            studio
                .regenerate_stickers_with(&mut StdRng::seed_from_u64(seed))
                .await?
        }
        None => studio.regenerate_stickers().await?,
    };
    println!(
        "  Stickers: {} painted, {} skipped",
        report.painted,
        report.skipped.len()
    );
    for id in &report.skipped {
        println!("    [WARN] could not load {id}");
    }

    let path = studio.download(&options.output).await?;
    println!("  Saved: {}", path.display());

    if let Some(init) = init {
        match init.await? {
            ClientStatus::Ready => println!("  Upload service: ready"),
            ClientStatus::Failed(reason) => println!("  Upload service: unavailable ({reason})"),
            ClientStatus::Uninitialized => println!("  Upload service: not initialized"),
        }

        let result = studio.publish().await?;
        if let Some(notice) = &result.notice {
            println!("  [WARN] {notice}");
        }
        println!("  Transaction: {}", result.id);
        println!("  Link: {}", result.link);
        if let Some(qr_path) = studio.download_qr(&options.output)? {
            println!("  QR code: {}", qr_path.display());
        }
    }

    Ok(())
}
