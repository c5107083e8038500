//! Write the QR code for a transaction link.

use std::path::PathBuf;

use memeforge_common::config::AppConfig;
use memeforge_publish::{encode_qr, tx_link, QrOptions};

pub fn run(config: &AppConfig, id: String, output: PathBuf) -> anyhow::Result<()> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("Transaction id must not be empty");
    }

    let link = tx_link(&config.upload.url, id);
    let qr = encode_qr(&link, QrOptions::from(&config.qr))?;
    let path = qr.save(&output, &config.qr.file_name)?;

    println!("Link: {link}");
    println!("QR code: {} ({}x{})", path.display(), qr.width, qr.width);
    Ok(())
}
