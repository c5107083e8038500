//! Lazily initialized upload client.
//!
//! The client is set up in the background at startup. Until that finishes,
//! or if it fails, uploads see [`UploadError::NotInitialized`].

use std::future::Future;
use std::sync::{Arc, RwLock};

use memeforge_common::config::UploadSettings;

use crate::client::{HttpUploadClient, UploadClient, UploadError};

/// Observable initialization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    Uninitialized,
    Ready,
    Failed(String),
}

enum ClientState {
    Uninitialized,
    Ready(Arc<dyn UploadClient>),
    Failed(String),
}

/// Shared slot holding the upload client once it is available.
#[derive(Clone)]
pub struct ClientHandle {
    state: Arc<RwLock<ClientState>>,
}

impl Default for ClientHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("status", &self.status())
            .finish()
    }
}

impl ClientHandle {
    /// A handle with no client yet.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ClientState::Uninitialized)),
        }
    }

    /// A handle that is ready immediately.
    pub fn ready(client: Arc<dyn UploadClient>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ClientState::Ready(client))),
        }
    }

    /// Run `init` and store its outcome.
    pub async fn initialize<F, Fut>(&self, init: F) -> ClientStatus
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn UploadClient>, UploadError>>,
    {
        let next = match init().await {
            Ok(client) => {
                tracing::info!(client = client.name(), "Upload client ready");
                ClientState::Ready(client)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload client initialization failed");
                ClientState::Failed(e.to_string())
            }
        };
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = next;
        self.status()
    }

    /// Connect an [`HttpUploadClient`] and store it.
    pub async fn connect_http(&self, settings: &UploadSettings) -> ClientStatus {
        self.initialize(|| async move {
            let client = HttpUploadClient::connect(settings).await?;
            Ok(Arc::new(client) as Arc<dyn UploadClient>)
        })
        .await
    }

    /// [`Self::connect_http`] on a background task.
    pub fn spawn_http_init(
        &self,
        settings: UploadSettings,
    ) -> tokio::task::JoinHandle<ClientStatus> {
        let handle = self.clone();
        tokio::spawn(async move { handle.connect_http(&settings).await })
    }

    pub fn status(&self) -> ClientStatus {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            ClientState::Uninitialized => ClientStatus::Uninitialized,
            ClientState::Ready(_) => ClientStatus::Ready,
            ClientState::Failed(reason) => ClientStatus::Failed(reason.clone()),
        }
    }

    /// The client, if initialization has succeeded.
    pub fn client(&self) -> Result<Arc<dyn UploadClient>, UploadError> {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            ClientState::Ready(client) => Ok(Arc::clone(client)),
            ClientState::Uninitialized => Err(UploadError::NotInitialized(
                "initialization has not finished".to_string(),
            )),
            ClientState::Failed(reason) => Err(UploadError::NotInitialized(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Tag, UploadReceipt};

    struct Fixed;

    #[async_trait::async_trait]
    impl UploadClient for Fixed {
        async fn upload(&self, _: &[u8], _: &[Tag]) -> Result<UploadReceipt, UploadError> {
            Ok(UploadReceipt { id: "fixed".into() })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_new_handle_is_uninitialized() {
        let handle = ClientHandle::new();
        assert_eq!(handle.status(), ClientStatus::Uninitialized);
        assert!(matches!(handle.client(), Err(UploadError::NotInitialized(_))));
    }

    #[tokio::test]
    async fn test_initialize_success_is_shared_between_clones() {
        let handle = ClientHandle::new();
        let observer = handle.clone();
        let status = handle
            .initialize(|| async { Ok(Arc::new(Fixed) as Arc<dyn UploadClient>) })
            .await;
        assert_eq!(status, ClientStatus::Ready);
        assert_eq!(observer.client().unwrap().name(), "fixed");
    }

    #[tokio::test]
    async fn test_initialize_failure_is_recorded() {
        let handle = ClientHandle::new();
        let status = handle
            .initialize(|| async { Err(UploadError::Unavailable("offline".into())) })
            .await;
        assert!(matches!(status, ClientStatus::Failed(ref r) if r.contains("offline")));
        assert!(matches!(handle.client(), Err(UploadError::NotInitialized(_))));
    }

    #[tokio::test]
    async fn test_spawn_http_init_with_bad_url_fails() {
        let settings = UploadSettings {
            url: "::::".to_string(),
            ..UploadSettings::default()
        };
        let handle = ClientHandle::new();
        let status = handle.spawn_http_init(settings).await.unwrap();
        assert!(matches!(status, ClientStatus::Failed(_)));
    }
}
