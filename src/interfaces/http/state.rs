use crate::application::orchestrator::BatchOrchestrator;
use crate::config::GatewayConfig;
use crate::domain::ports::ReceiptStoreRef;
use serde::Serialize;
use std::sync::Arc;

/// Presence of each piece of configuration, as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub client_id: bool,
    pub client_secret: bool,
    pub conta_corrente: bool,
    pub certificado: bool,
    pub storage: bool,
    pub storage_provider: String,
}

impl HealthStatus {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            status: "ok",
            client_id: config.credentials.client_id.is_some(),
            client_secret: config.credentials.client_secret.is_some(),
            conta_corrente: config.account.is_some(),
            certificado: config.tls.cert_path.is_file() && config.tls.key_path.is_file(),
            storage: config.storage.is_some(),
            storage_provider: config
                .storage
                .as_ref()
                .map(|s| s.provider.clone())
                .unwrap_or_else(|| "local".to_string()),
        }
    }
}

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub receipts: ReceiptStoreRef,
    pub health: HealthStatus,
}
