//! Error types shared across Memeforge crates.

use std::path::PathBuf;

/// Message shown when an action needs a base image and none is loaded.
pub const NO_BASE_IMAGE_MESSAGE: &str = "Please upload an image first";

/// Top-level error type for Memeforge operations.
#[derive(Debug, thiserror::Error)]
pub enum MemeforgeError {
    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Upload error: {message}")]
    Upload { message: String },

    #[error("QR code error: {message}")]
    Qr { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{}", NO_BASE_IMAGE_MESSAGE)]
    NoBaseImage,

    #[error("Another {action} is already in progress")]
    Busy { action: String },

    #[error("Unsupported media: {message}")]
    UnsupportedMedia { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MemeforgeError.
pub type MemeforgeResult<T> = Result<T, MemeforgeError>;

impl MemeforgeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload {
            message: msg.into(),
        }
    }

    pub fn qr(msg: impl Into<String>) -> Self {
        Self::Qr {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn busy(action: impl Into<String>) -> Self {
        Self::Busy {
            action: action.into(),
        }
    }

    pub fn unsupported_media(msg: impl Into<String>) -> Self {
        Self::UnsupportedMedia {
            message: msg.into(),
        }
    }

    /// Whether this error is a user-facing precondition failure rather
    /// than a fault.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoBaseImage | Self::Busy { .. } | Self::UnsupportedMedia { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_base_image_message_is_user_facing() {
        let err = MemeforgeError::NoBaseImage;
        assert_eq!(err.to_string(), "Please upload an image first");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_render_error_is_not_precondition() {
        let err = MemeforgeError::render("surface lost");
        assert_eq!(err.to_string(), "Render error: surface lost");
        assert!(!err.is_precondition());
    }
}
