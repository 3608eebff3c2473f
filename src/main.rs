use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pix_gateway::application::orchestrator::BatchOrchestrator;
use pix_gateway::config::{Cli, GatewayConfig};
use pix_gateway::domain::ports::{ObjectStoreBox, ReceiptStoreRef};
use pix_gateway::infrastructure::in_memory::InMemoryReceiptStore;
use pix_gateway::infrastructure::inter::oauth::OAuthAuthenticator;
use pix_gateway::infrastructure::inter::pix::PixPaymentClient;
use pix_gateway::infrastructure::object_store::HttpObjectStore;
use pix_gateway::infrastructure::pacing::pacer_for;
use pix_gateway::infrastructure::pdf_receipt::PdfReceiptRenderer;
use pix_gateway::infrastructure::publisher::FallbackReceiptPublisher;
use pix_gateway::infrastructure::transport::{mtls_client, plain_client};
use pix_gateway::interfaces::http::{AppState, HealthStatus, create_routes};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config: GatewayConfig = Cli::parse().into();
    init_tracing(config.log_json);

    // Certificate and key are read once; a missing file stops startup
    let bank_client = mtls_client(&config.tls)?;

    let receipts: ReceiptStoreRef = Arc::new(InMemoryReceiptStore::new(
        config.receipt_cache.ttl,
        config.receipt_cache.capacity,
    ));

    let remote: Option<ObjectStoreBox> = match &config.storage {
        Some(storage) => {
            let client = plain_client(&config.tls)?;
            Some(Box::new(HttpObjectStore::new(client, storage)))
        }
        None => {
            warn!("no receipt storage configured, receipts will be served by this process");
            None
        }
    };

    let orchestrator = BatchOrchestrator::new(
        Box::new(OAuthAuthenticator::new(
            bank_client.clone(),
            &config.api_url,
            config.credentials.clone(),
        )),
        Box::new(PixPaymentClient::new(
            bank_client,
            &config.api_url,
            config.account.clone(),
        )),
        Box::new(PdfReceiptRenderer::new(config.sender.clone())),
        Box::new(FallbackReceiptPublisher::new(
            remote,
            receipts.clone(),
            &config.public_url,
        )),
        pacer_for(config.payment_delay),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        receipts,
        health: HealthStatus::from_config(&config),
    };
    if !state.health.client_id || !state.health.client_secret {
        warn!("CLIENT_ID / CLIENT_SECRET not set, every batch will fail authentication");
    }

    let app = create_routes(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .into_diagnostic()?;

    info!(port = config.port, "pix gateway listening");
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}
