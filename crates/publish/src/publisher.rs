//! Upload, fallback, link, QR.

use std::sync::Arc;

use memeforge_common::config::{FallbackPolicy, QrSettings, UploadSettings};
use memeforge_common::error::{MemeforgeError, MemeforgeResult};

use crate::client::{Tag, UploadClient, UploadError};
use crate::handle::ClientHandle;
use crate::mock::mock_transaction_id;
use crate::qr::{encode_qr, QrImage, QrOptions};

/// Notice attached to results that carry a placeholder id.
pub const MOCK_NOTICE: &str = "Test mode: Using mock data";

/// Outcome of a publish action.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Transaction id, real or placeholder.
    pub id: String,
    /// `<service-base>/tx/<id>`.
    pub link: String,
    /// QR code encoding `link`.
    pub qr: QrImage,
    /// Whether `id` is a placeholder.
    pub mock: bool,
    /// Non-blocking notice for the user, set for mock results.
    pub notice: Option<String>,
    /// RFC 3339 timestamp.
    pub published_at: String,
}

/// Displayed link for transaction `id` on service `base`.
pub fn tx_link(base: &str, id: &str) -> String {
    format!("{}/tx/{id}", base.trim_end_matches('/'))
}

fn falls_back(policy: FallbackPolicy, err: &UploadError) -> bool {
    match policy {
        FallbackPolicy::AnyError => true,
        FallbackPolicy::ServiceUnavailable => err.is_service_unavailable(),
        FallbackPolicy::Never => false,
    }
}

/// Publishes artifacts through a [`ClientHandle`].
#[derive(Debug, Clone)]
pub struct Publisher {
    handle: ClientHandle,
    base_url: String,
    fallback: FallbackPolicy,
    qr: QrOptions,
}

impl Publisher {
    pub fn new(handle: ClientHandle, upload: &UploadSettings, qr: &QrSettings) -> Self {
        Self {
            handle,
            base_url: upload.url.clone(),
            fallback: upload.fallback,
            qr: QrOptions::from(qr),
        }
    }

    /// Publisher whose client is ready immediately.
    pub fn with_client(client: Arc<dyn UploadClient>, upload: &UploadSettings) -> Self {
        Self::new(ClientHandle::ready(client), upload, &QrSettings::default())
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn qr_options(&self) -> QrOptions {
        self.qr
    }

    /// Upload `payload` (a PNG) and build the shareable link and QR.
    pub async fn publish(&self, payload: &[u8]) -> MemeforgeResult<PublishResult> {
        let started = std::time::Instant::now();
        let tags = [Tag::content_type("image/png")];

        let outcome = match self.handle.client() {
            Ok(client) => {
                tracing::info!(client = client.name(), bytes = payload.len(), "Uploading artifact");
                client.upload(payload, &tags).await
            }
            Err(e) => Err(e),
        };

        let (id, mock) = match outcome {
            Ok(receipt) => (receipt.id, false),
            Err(e) if falls_back(self.fallback, &e) => {
                tracing::warn!(error = %e, policy = ?self.fallback, "Upload failed, using mock transaction id");
                (mock_transaction_id(), true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Upload failed");
                return Err(MemeforgeError::upload(e.to_string()));
            }
        };

        let link = tx_link(&self.base_url, &id);
        let qr = encode_qr(&link, self.qr)?;

        tracing::info!(
            id = %id,
            mock,
            upload_ms = started.elapsed().as_millis(),
            "Publish complete"
        );

        Ok(PublishResult {
            id,
            link,
            qr,
            mock,
            notice: mock.then(|| MOCK_NOTICE.to_string()),
            published_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UploadReceipt;

    struct Failing(fn() -> UploadError);

    #[async_trait::async_trait]
    impl UploadClient for Failing {
        async fn upload(&self, _: &[u8], _: &[Tag]) -> Result<UploadReceipt, UploadError> {
            Err((self.0)())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Accepting;

    #[async_trait::async_trait]
    impl UploadClient for Accepting {
        async fn upload(&self, payload: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError> {
            assert_eq!(tags, &[Tag::content_type("image/png")]);
            Ok(UploadReceipt {
                id: format!("tx{}", payload.len()),
            })
        }

        fn name(&self) -> &str {
            "accepting"
        }
    }

    fn settings(fallback: FallbackPolicy) -> UploadSettings {
        UploadSettings {
            fallback,
            ..UploadSettings::default()
        }
    }

    fn is_hex64(id: &str) -> bool {
        id.len() == 64 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn test_tx_link() {
        assert_eq!(
            tx_link("https://devnet.irys.xyz", "abc"),
            "https://devnet.irys.xyz/tx/abc"
        );
        assert_eq!(tx_link("https://gw.example/", "abc"), "https://gw.example/tx/abc");
    }

    #[tokio::test]
    async fn test_successful_upload_is_not_mock() {
        let publisher = Publisher::with_client(Arc::new(Accepting), &UploadSettings::default());
        let result = publisher.publish(&[1, 2, 3]).await.unwrap();
        assert_eq!(result.id, "tx3");
        assert!(!result.mock);
        assert!(result.notice.is_none());
        assert_eq!(result.link, "https://devnet.irys.xyz/tx/tx3");
        assert_eq!(result.qr.text, result.link);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_mock_id() {
        let publisher = Publisher::with_client(
            Arc::new(Failing(|| UploadError::Rejected {
                status: 402,
                message: "not funded".into(),
            })),
            &settings(FallbackPolicy::AnyError),
        );
        let result = publisher.publish(b"png").await.unwrap();
        assert!(result.mock);
        assert!(is_hex64(&result.id), "{}", result.id);
        assert_eq!(result.notice.as_deref(), Some(MOCK_NOTICE));
        assert_eq!(result.link, format!("https://devnet.irys.xyz/tx/{}", result.id));
        assert_eq!(result.qr.text, result.link);
    }

    #[tokio::test]
    async fn test_uninitialized_client_falls_back() {
        let publisher = Publisher::new(
            ClientHandle::new(),
            &settings(FallbackPolicy::ServiceUnavailable),
            &QrSettings::default(),
        );
        let result = publisher.publish(b"png").await.unwrap();
        assert!(result.mock);
    }

    #[tokio::test]
    async fn test_service_unavailable_policy_propagates_rejection() {
        let publisher = Publisher::with_client(
            Arc::new(Failing(|| UploadError::Rejected {
                status: 500,
                message: "boom".into(),
            })),
            &settings(FallbackPolicy::ServiceUnavailable),
        );
        let err = publisher.publish(b"png").await.unwrap_err();
        assert!(matches!(err, MemeforgeError::Upload { .. }));
    }

    #[tokio::test]
    async fn test_never_policy_propagates_network_failure() {
        let publisher = Publisher::with_client(
            Arc::new(Failing(|| UploadError::Unavailable("offline".into()))),
            &settings(FallbackPolicy::Never),
        );
        assert!(publisher.publish(b"png").await.is_err());
    }
}
