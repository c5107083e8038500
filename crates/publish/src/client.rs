//! Upload service boundary.

use std::time::Duration;

use memeforge_common::config::UploadSettings;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;

/// A name/value tag attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The `Content-Type` tag for a payload of `mime` type.
    pub fn content_type(mime: &str) -> Self {
        Self::new("Content-Type", mime)
    }
}

/// What the service returns for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    /// Transaction id assigned by the service.
    pub id: String,
}

/// Classified upload failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The service could not be reached (DNS, connect, timeout).
    #[error("upload service unavailable: {0}")]
    Unavailable(String),

    /// No client is ready to take the upload.
    #[error("upload client not initialized: {0}")]
    NotInitialized(String),

    /// The service answered with a non-success status.
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The service answered successfully but the body made no sense.
    #[error("invalid upload response: {0}")]
    InvalidResponse(String),

    /// Client configuration is unusable.
    #[error("invalid upload configuration: {0}")]
    Config(String),
}

impl UploadError {
    /// Whether the failure means the service could not be used at all.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::NotInitialized(_))
    }
}

/// Abstract interface to a storage service.
#[async_trait::async_trait]
pub trait UploadClient: Send + Sync {
    /// Store `payload` and return the assigned transaction id.
    async fn upload(&self, payload: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError>;

    /// Client name, for logging.
    fn name(&self) -> &str;
}

/// HTTP gateway client.
///
/// Posts the payload to `<url>/upload?token=<token>` with the key as a
/// bearer credential and each tag as an `X-Tag-<name>` header. Expects a
/// JSON body `{"id": "..."}` back.
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    http: reqwest::Client,
    base: reqwest::Url,
    token: String,
    key: String,
}

impl HttpUploadClient {
    /// Build a client from settings without touching the network.
    pub fn new(settings: &UploadSettings) -> Result<Self, UploadError> {
        let base = reqwest::Url::parse(settings.url.trim_end_matches('/'))
            .map_err(|e| UploadError::Config(format!("bad service url {:?}: {e}", settings.url)))?;
        if settings.key.is_empty() {
            return Err(UploadError::Config("upload key is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| UploadError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base,
            token: settings.token.clone(),
            key: settings.key.clone(),
        })
    }

    /// Build a client and check that the service answers.
    pub async fn connect(settings: &UploadSettings) -> Result<Self, UploadError> {
        let client = Self::new(settings)?;
        let info_url = client.endpoint("info");
        let response = client
            .http
            .get(info_url)
            .send()
            .await
            .map_err(|e| UploadError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(UploadError::Unavailable(format!(
                "service info returned {}",
                response.status()
            )));
        }
        tracing::info!(url = %client.base, "Upload service reachable");
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base.as_str().trim_end_matches('/'))
    }
}

/// `X-Tag-<name>` header for `tag`. Rejected before anything is sent.
fn tag_header(tag: &Tag) -> Result<(HeaderName, HeaderValue), UploadError> {
    let name = HeaderName::from_bytes(format!("X-Tag-{}", tag.name).as_bytes())
        .map_err(|e| UploadError::Config(format!("invalid tag name {:?}: {e}", tag.name)))?;
    let value = HeaderValue::from_str(&tag.value)
        .map_err(|e| UploadError::Config(format!("invalid value for tag {:?}: {e}", tag.name)))?;
    Ok((name, value))
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: Option<String>,
}

#[async_trait::async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(&self, payload: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError> {
        let mut request = self
            .http
            .post(self.endpoint("upload"))
            .query(&[("token", self.token.as_str())])
            .bearer_auth(&self.key);
        for tag in tags {
            let (name, value) = tag_header(tag)?;
            if tag.name.eq_ignore_ascii_case("content-type") {
                request = request.header(reqwest::header::CONTENT_TYPE, value.clone());
            }
            request = request.header(name, value);
        }

        let response = request
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| UploadError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        match body.id {
            Some(id) if !id.trim().is_empty() => Ok(UploadReceipt { id }),
            _ => Err(UploadError::InvalidResponse(
                "response did not contain an id".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        let settings = UploadSettings {
            url: "not a url".to_string(),
            ..UploadSettings::default()
        };
        assert!(matches!(
            HttpUploadClient::new(&settings),
            Err(UploadError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let settings = UploadSettings {
            key: String::new(),
            ..UploadSettings::default()
        };
        assert!(matches!(
            HttpUploadClient::new(&settings),
            Err(UploadError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let settings = UploadSettings {
            url: "https://devnet.irys.xyz/".to_string(),
            ..UploadSettings::default()
        };
        let client = HttpUploadClient::new(&settings).unwrap();
        assert_eq!(client.endpoint("upload"), "https://devnet.irys.xyz/upload");
    }

    #[test]
    fn test_tag_header_prefixes_name() {
        let (name, value) = tag_header(&Tag::new("App-Name", "memeforge")).unwrap();
        assert_eq!(name.as_str(), "x-tag-app-name");
        assert_eq!(value.to_str().unwrap(), "memeforge");
    }

    #[tokio::test]
    async fn test_malformed_tag_is_config_error_before_send() {
        // Port 9 on localhost: reaching send() would surface as Unavailable.
        let settings = UploadSettings {
            url: "http://127.0.0.1:9".to_string(),
            ..UploadSettings::default()
        };
        let client = HttpUploadClient::new(&settings).unwrap();

        let err = client
            .upload(b"png", &[Tag::new("bad name", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Config(_)), "got {err:?}");
        assert!(!err.is_service_unavailable());

        let err = client
            .upload(b"png", &[Tag::new("Note", "line\nbreak")])
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Config(_)), "got {err:?}");
    }

    #[test]
    fn test_service_unavailable_classification() {
        assert!(UploadError::Unavailable("dns".into()).is_service_unavailable());
        assert!(UploadError::NotInitialized("pending".into()).is_service_unavailable());
        assert!(!UploadError::Config("key".into()).is_service_unavailable());
        assert!(!UploadError::Rejected {
            status: 402,
            message: "fund".into()
        }
        .is_service_unavailable());
    }
}
