use super::instruction::PaymentInstruction;
use super::outcome::SubmittedPayment;
use super::receipt::{ReceiptDocument, ReceiptLocator};
use super::token::AccessToken;
use crate::error::{AuthError, PaymentError, PublishError, RenderError};
use async_trait::async_trait;
use std::sync::Arc;

/// Exchanges service credentials for an access token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<AccessToken, AuthError>;
}

/// Sends one payment instruction to the provider.
#[async_trait]
pub trait PaymentSubmitter: Send + Sync {
    async fn submit(
        &self,
        token: &AccessToken,
        instruction: &PaymentInstruction,
    ) -> Result<SubmittedPayment, PaymentError>;
}

/// Produces a receipt document for a completed payment.
pub trait ReceiptRenderer: Send + Sync {
    fn render(
        &self,
        instruction: &PaymentInstruction,
        payment: &SubmittedPayment,
    ) -> Result<ReceiptDocument, RenderError>;
}

/// Persists a rendered receipt and reports where it can be fetched.
#[async_trait]
pub trait ReceiptPublisher: Send + Sync {
    async fn publish(&self, document: ReceiptDocument) -> Result<ReceiptLocator, PublishError>;
}

/// Remote object storage accepting uploaded documents.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn provider(&self) -> &str;
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, PublishError>;
}

/// Process-local store for receipts served by the service itself.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn insert(&self, id: String, document: ReceiptDocument) -> Result<(), PublishError>;
    async fn get(&self, id: &str) -> Option<ReceiptDocument>;
}

/// Pacing policy applied between consecutive submissions of a batch.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

pub type AuthenticatorBox = Box<dyn Authenticator>;
pub type PaymentSubmitterBox = Box<dyn PaymentSubmitter>;
pub type ReceiptRendererBox = Box<dyn ReceiptRenderer>;
pub type ReceiptPublisherBox = Box<dyn ReceiptPublisher>;
pub type ObjectStoreBox = Box<dyn ObjectStore>;
pub type PacerBox = Box<dyn Pacer>;
/// Shared between the publisher and the HTTP handler serving receipts.
pub type ReceiptStoreRef = Arc<dyn ReceiptStore>;
