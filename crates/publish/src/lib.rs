//! Memeforge Publish
//!
//! Hands exported artifacts to an external storage service and turns the
//! returned transaction id into a shareable link and QR code.
//!
//! Upload failures do not fail the user-visible action by default: a
//! random placeholder id is substituted and the result is flagged as mock
//! data. Which failures qualify is governed by
//! [`FallbackPolicy`](memeforge_common::config::FallbackPolicy).

pub mod client;
pub mod handle;
pub mod mock;
pub mod publisher;
pub mod qr;

pub use client::{HttpUploadClient, Tag, UploadClient, UploadError, UploadReceipt};
pub use handle::{ClientHandle, ClientStatus};
pub use mock::mock_transaction_id;
pub use publisher::{tx_link, PublishResult, Publisher, MOCK_NOTICE};
pub use qr::{encode_qr, QrImage, QrOptions};
