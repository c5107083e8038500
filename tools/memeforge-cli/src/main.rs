//! Memeforge CLI - compose memes from an image, a caption, and stickers.
//!
//! Usage:
//!   memeforge compose <IMAGE>   Add caption and stickers, export, optionally upload
//!   memeforge stickers          Print a random sticker placement set
//!   memeforge qr <ID>           Write the QR code for a transaction link
//!   memeforge catalog           List sticker assets
//!   memeforge config            Show or initialize configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memeforge_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "memeforge",
    about = "Caption an image, decorate it with stickers, and publish it",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a meme from an image and write it out
    Compose {
        /// Base image
        image: PathBuf,

        /// Caption text
        #[arg(short, long, conflicts_with = "random_caption")]
        caption: Option<String>,

        /// Pick a random caption phrase
        #[arg(long)]
        random_caption: bool,

        /// Number of stickers to place
        #[arg(long)]
        stickers: Option<usize>,

        /// Directory holding the sticker catalog
        #[arg(long)]
        stickers_dir: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Upload the result and write its QR code
        #[arg(long)]
        upload: bool,

        /// Seed for sticker placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a random sticker placement set as JSON
    Stickers {
        /// Number of stickers
        #[arg(long)]
        count: Option<usize>,

        /// Seed for sticker placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the QR code for a transaction id
    Qr {
        /// Transaction id
        id: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List sticker catalog assets
    Catalog,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    memeforge_common::logging::init_logging(&logging);
    tracing::debug!(config_path = ?cli.config, upload_url = %config.upload.url, "Configuration loaded");

    match cli.command {
        Commands::Compose {
            image,
            caption,
            random_caption,
            stickers,
            stickers_dir,
            output,
            upload,
            seed,
        } => {
            let options = commands::compose::ComposeOptions {
                image,
                caption,
                random_caption,
                stickers,
                stickers_dir,
                output,
                upload,
                seed,
            };
            commands::compose::run(config, options).await
        }
        Commands::Stickers { count, seed } => commands::stickers::run(&config, count, seed),
        Commands::Qr { id, output } => commands::qr::run(&config, id, output),
        Commands::Catalog => commands::catalog::run(&config),
        Commands::Config { init } => commands::config::run(&config, cli.config, init),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_caption_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "memeforge",
            "compose",
            "in.png",
            "--caption",
            "hi",
            "--random-caption",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_compose_defaults() {
        let cli = Cli::try_parse_from(["memeforge", "compose", "in.png"]).unwrap();
        match cli.command {
            Commands::Compose {
                output,
                upload,
                seed,
                ..
            } => {
                assert_eq!(output, PathBuf::from("."));
                assert!(!upload);
                assert!(seed.is_none());
            }
            _ => panic!("expected compose"),
        }
    }
}
