use super::pix_key::KeyType;
use super::receipt::ReceiptLocator;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// What the payment provider accepted for one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedPayment {
    pub idempotency_key: Uuid,
    pub key_type: KeyType,
    pub response: Value,
}

/// Result of one instruction. A payment can succeed while its receipt is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum PaymentOutcome {
    #[serde(rename = "ok")]
    Succeeded {
        #[serde(rename = "tipoChave")]
        key_type: KeyType,
        #[serde(rename = "idempotencyKey")]
        idempotency_key: Uuid,
        response: Value,
        #[serde(rename = "comprovante")]
        receipt: Option<ReceiptLocator>,
    },
    #[serde(rename = "erro")]
    Failed {
        #[serde(rename = "erro")]
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

impl PaymentOutcome {
    pub fn succeeded(payment: SubmittedPayment, receipt: Option<ReceiptLocator>) -> Self {
        PaymentOutcome::Succeeded {
            key_type: payment.key_type,
            idempotency_key: payment.idempotency_key,
            response: payment.response,
            receipt,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded { .. })
    }

    pub fn receipt(&self) -> Option<&ReceiptLocator> {
        match self {
            PaymentOutcome::Succeeded { receipt, .. } => receipt.as_ref(),
            PaymentOutcome::Failed { .. } => None,
        }
    }
}

/// Outcome tagged with the recipient key it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(flatten)]
    pub outcome: PaymentOutcome,
}

/// Per-item outcomes in input order plus summary counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub status: &'static str,
    pub total: usize,
    #[serde(rename = "sucessos")]
    pub succeeded: usize,
    #[serde(rename = "erros")]
    pub failed: usize,
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<ItemResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            status: "success",
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
