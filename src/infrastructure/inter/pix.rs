use super::error_details;
use crate::domain::instruction::PaymentInstruction;
use crate::domain::outcome::SubmittedPayment;
use crate::domain::pix_key::KeyType;
use crate::domain::ports::PaymentSubmitter;
use crate::domain::token::AccessToken;
use crate::error::PaymentError;
use crate::infrastructure::locale::today_in_brasilia;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub const PAYMENT_PATH: &str = "/banking/v2/pix";
pub const IDEMPOTENCY_HEADER: &str = "x-id-idempotente";
pub const ACCOUNT_HEADER: &str = "x-conta-corrente";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub tipo: &'static str,
    pub chave: String,
    pub tipo_chave: KeyType,
}

/// Body of a Pix payment request, normalized from a [`PaymentInstruction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPaymentRequest {
    pub valor: String,
    pub data_pagamento: NaiveDate,
    pub descricao: String,
    pub destinatario: Recipient,
}

impl PixPaymentRequest {
    pub fn from_instruction(
        instruction: &PaymentInstruction,
        today: NaiveDate,
    ) -> Result<Self, PaymentError> {
        let amount = instruction.amount()?;
        let key = instruction.recipient_key()?;

        Ok(Self {
            valor: amount.to_wire(),
            data_pagamento: instruction.payment_date(today),
            descricao: instruction.description_or_default().to_string(),
            destinatario: Recipient {
                tipo: "CHAVE",
                chave: key.to_string(),
                tipo_chave: instruction.resolved_key_type(),
            },
        })
    }
}

/// Submits Pix payments to the bank, one call per instruction.
///
/// Every call carries a fresh idempotency key, so two identical instructions
/// are never collapsed by the provider.
pub struct PixPaymentClient {
    client: Client,
    payment_url: String,
    account: Option<String>,
}

impl PixPaymentClient {
    pub fn new(client: Client, base_url: &str, account: Option<String>) -> Self {
        Self {
            client,
            payment_url: format!("{}{}", base_url.trim_end_matches('/'), PAYMENT_PATH),
            account,
        }
    }
}

#[async_trait]
impl PaymentSubmitter for PixPaymentClient {
    async fn submit(
        &self,
        token: &AccessToken,
        instruction: &PaymentInstruction,
    ) -> Result<SubmittedPayment, PaymentError> {
        let body = PixPaymentRequest::from_instruction(instruction, today_in_brasilia())?;
        let idempotency_key = Uuid::new_v4();

        let mut request = self
            .client
            .post(&self.payment_url)
            .bearer_auth(token.secret())
            .header(IDEMPOTENCY_HEADER, idempotency_key.to_string())
            .json(&body);
        if let Some(account) = &self.account {
            request = request.header(ACCOUNT_HEADER, account);
        }

        debug!(%idempotency_key, valor = %body.valor, "submitting pix payment");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                details: error_details(response).await,
            });
        }

        let text = response.text().await?;
        let response = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(SubmittedPayment {
            idempotency_key,
            key_type: body.destinatario.tipo_chave,
            response,
        })
    }
}
