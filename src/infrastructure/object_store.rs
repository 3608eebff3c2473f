use crate::config::StorageConfig;
use crate::domain::ports::ObjectStore;
use crate::error::PublishError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    path: &'a str,
    content_type: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(alias = "publicUrl", alias = "secure_url")]
    url: String,
}

/// Uploads documents as base64 JSON to an HTTP storage endpoint.
pub struct HttpObjectStore {
    client: Client,
    url: String,
    token: Option<String>,
    provider: String,
}

impl HttpObjectStore {
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
            provider: config.provider.clone(),
        }
    }

    fn upload_failed(&self, reason: impl Into<String>) -> PublishError {
        PublishError::Upload {
            provider: self.provider.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, PublishError> {
        let body = UploadRequest {
            path,
            content_type,
            content: STANDARD.encode(bytes),
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.upload_failed(format!("status {}", status.as_u16())));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| self.upload_failed(format!("unexpected response: {}", e)))?;
        if uploaded.url.is_empty() {
            return Err(self.upload_failed("empty url in response"));
        }
        Ok(uploaded.url)
    }
}
