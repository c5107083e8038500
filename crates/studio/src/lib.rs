//! Memeforge Studio
//!
//! One editing session: a base image, a caption, and a sticker set, plus
//! the actions a user takes on them. Every action keeps the session usable
//! whether it succeeds or fails.

pub mod gate;
pub mod session;

pub use gate::{ActionGate, ActionTicket};
pub use session::Studio;
