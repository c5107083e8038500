pub mod catalog;
pub mod compose;
pub mod config;
pub mod qr;
pub mod stickers;
