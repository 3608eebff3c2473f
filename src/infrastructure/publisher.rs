use crate::domain::ports::{ObjectStoreBox, ReceiptPublisher, ReceiptStoreRef};
use crate::domain::receipt::{ReceiptDocument, ReceiptLocator};
use crate::error::PublishError;
use crate::infrastructure::locale::now_in_brasilia;
use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

pub const LOCAL_PROVIDER: &str = "local";

/// Publishes receipts to remote storage, falling back to the local store.
///
/// Upload failures never reach the caller: the receipt is kept in the
/// in-process store and served by this service instead. Only a failure of
/// the local store itself is reported.
pub struct FallbackReceiptPublisher {
    remote: Option<ObjectStoreBox>,
    local: ReceiptStoreRef,
    public_url: String,
}

impl FallbackReceiptPublisher {
    pub fn new(remote: Option<ObjectStoreBox>, local: ReceiptStoreRef, public_url: &str) -> Self {
        Self {
            remote,
            local,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    async fn upload_remote(&self, document: &ReceiptDocument) -> Option<ReceiptLocator> {
        let remote = self.remote.as_ref()?;
        let path = format!(
            "comprovantes/{}/{}",
            now_in_brasilia().format("%Y-%m"),
            document.filename
        );

        match remote
            .upload(&path, &document.bytes, &document.content_type)
            .await
        {
            Ok(url) => {
                info!(provider = remote.provider(), %url, "receipt uploaded");
                Some(ReceiptLocator {
                    download_url: url.clone(),
                    url,
                    provider: remote.provider().to_string(),
                })
            }
            Err(e) => {
                warn!(provider = remote.provider(), error = %e, "receipt upload failed, keeping it locally");
                None
            }
        }
    }

    async fn keep_local(&self, document: ReceiptDocument) -> Result<ReceiptLocator, PublishError> {
        let id = Uuid::new_v4().simple().to_string();
        self.local.insert(id.clone(), document).await?;

        let url = format!("{}/comprovante/{}", self.public_url, id);
        info!(%id, "receipt kept in local store");
        Ok(ReceiptLocator {
            download_url: format!("{}?download=true", url),
            url,
            provider: LOCAL_PROVIDER.to_string(),
        })
    }
}

#[async_trait]
impl ReceiptPublisher for FallbackReceiptPublisher {
    async fn publish(&self, document: ReceiptDocument) -> Result<ReceiptLocator, PublishError> {
        if let Some(locator) = self.upload_remote(&document).await {
            return Ok(locator);
        }
        self.keep_local(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ObjectStore, ReceiptStore};
    use crate::infrastructure::in_memory::InMemoryReceiptStore;
    use std::sync::Arc;
    use std::time::Duration;

    struct BrokenStorage;

    #[async_trait]
    impl ObjectStore for BrokenStorage {
        fn provider(&self) -> &str {
            "broken"
        }

        async fn upload(&self, _: &str, _: &[u8], _: &str) -> Result<String, PublishError> {
            Err(PublishError::Upload {
                provider: "broken".to_string(),
                reason: "status 503".to_string(),
            })
        }
    }

    struct EchoStorage;

    #[async_trait]
    impl ObjectStore for EchoStorage {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn upload(&self, path: &str, _: &[u8], _: &str) -> Result<String, PublishError> {
            Ok(format!("https://cdn.example/{}", path))
        }
    }

    fn document() -> ReceiptDocument {
        ReceiptDocument {
            bytes: b"%PDF-1.5".to_vec(),
            filename: "comprovante-pix-20240615-abcdef12.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }
    }

    fn store() -> Arc<InMemoryReceiptStore> {
        Arc::new(InMemoryReceiptStore::new(Duration::from_secs(60), 8))
    }

    #[tokio::test]
    async fn test_remote_upload() {
        let local = store();
        let publisher =
            FallbackReceiptPublisher::new(Some(Box::new(EchoStorage)), local.clone(), "http://x");

        let locator = publisher.publish(document()).await.unwrap();
        assert_eq!(locator.provider, "echo");
        assert!(locator.url.starts_with("https://cdn.example/comprovantes/"));
        assert!(locator.url.ends_with("comprovante-pix-20240615-abcdef12.pdf"));
        assert!(local.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_upload_falls_back() {
        let local = store();
        let publisher = FallbackReceiptPublisher::new(
            Some(Box::new(BrokenStorage)),
            local.clone(),
            "http://localhost:3000/",
        );

        let locator = publisher.publish(document()).await.unwrap();
        assert_eq!(locator.provider, LOCAL_PROVIDER);
        assert!(locator.url.starts_with("http://localhost:3000/comprovante/"));
        assert_eq!(locator.download_url, format!("{}?download=true", locator.url));

        let id = locator.url.rsplit('/').next().unwrap();
        assert_eq!(local.get(id).await.unwrap(), document());
    }

    #[tokio::test]
    async fn test_unconfigured_storage_uses_local() {
        let local = store();
        let publisher = FallbackReceiptPublisher::new(None, local.clone(), "http://localhost:3000");

        let first = publisher.publish(document()).await.unwrap();
        let second = publisher.publish(document()).await.unwrap();
        assert_ne!(first.url, second.url);
        assert_eq!(local.len().await, 2);
    }
}
