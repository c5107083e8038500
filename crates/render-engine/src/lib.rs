//! Memeforge Render Engine
//!
//! Paints a composition onto a raster surface and flattens it, together
//! with the caption layer, into an exportable PNG.
//!
//! # Pipeline Architecture
//!
//! ```text
//! base image ──┐
//!              ├── Surface (natural size)
//! placements ──┘         │
//!                        ├── Sticker assets (joined load, paint order)
//!                        │
//!                        ├── Layout fit + export scale (2x)
//! caption ───────────────┘         │
//!                                  ├── Caption overlay (shadow + text)
//!                                  ▼
//!                            Encode (PNG)
//!                                  │
//!                                  ▼
//!                          nft-with-stickers.png
//! ```

pub mod assets;
pub mod caption;
pub mod compositor;
pub mod export;
pub mod surface;

pub use assets::{AssetSource, FsAssetSource, MemoryAssetSource};
pub use caption::CaptionRenderer;
pub use compositor::{Compositor, RenderReport};
pub use export::*;
pub use surface::Surface;
