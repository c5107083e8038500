//! Memeforge Composition Model
//!
//! Defines the core data contracts for a composition:
//! - **Catalog:** The fixed, read-only set of sticker assets
//! - **Placement:** Position, size, and rotation of one sticker instance
//! - **State:** Base image, caption, and the ordered placement set
//!
//! Sticker positions are stored as percentages of the surface so they
//! scale with whatever pixel dimensions the base image has.

pub mod catalog;
pub mod placement;
pub mod state;

pub use catalog::*;
pub use placement::*;
pub use state::*;
