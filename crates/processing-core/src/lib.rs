//! Memeforge Processing Core
//!
//! Generates the random decisions a composition is made of:
//! - **Placements:** Pick distinct stickers and scatter them over the image
//! - **Phrases:** Pick a caption from the built-in phrase list
//!
//! This crate is pure computation with no I/O and no imaging.
//! All inputs are data; all outputs are data.

pub mod phrases;
pub mod placement;

pub use phrases::random_phrase;
pub use placement::PlacementGenerator;
