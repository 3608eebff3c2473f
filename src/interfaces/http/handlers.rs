use super::state::AppState;
use crate::domain::instruction::PaymentInstruction;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Items stay raw JSON here and are decoded one by one, so a malformed item
/// becomes a failed result instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct PaymentBatchRequest {
    #[serde(rename = "pagamentos")]
    pub payments: Vec<Value>,
}

impl PaymentBatchRequest {
    pub fn instructions(self) -> Vec<PaymentInstruction> {
        self.payments
            .into_iter()
            .map(PaymentInstruction::from_json)
            .collect()
    }
}

/// Body returned when a request fails as a whole.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn error_response(status: StatusCode, message: impl Into<String>, details: Option<Value>) -> Response {
    let body = ErrorBody {
        status: "error",
        message: message.into(),
        details,
    };
    (status, Json(body)).into_response()
}

/// `POST /pagar`
pub async fn pay(
    State(state): State<AppState>,
    request: Result<Json<PaymentBatchRequest>, JsonRejection>,
) -> Response {
    let instructions = match request {
        Ok(Json(request)) => request.instructions(),
        Err(rejection) => {
            return error_response(
                rejection.status(),
                "invalid payment batch",
                Some(Value::String(rejection.body_text())),
            );
        }
    };

    let orchestrator = state.orchestrator.clone();
    // Run on its own task so a panic inside the batch still yields a 500 body
    let batch =
        tokio::spawn(async move { orchestrator.process_batch(&instructions).await }).await;

    match batch {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(e)) => {
            let details = e
                .details()
                .cloned()
                .unwrap_or_else(|| Value::String("sem detalhes".to_string()));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), Some(details))
        }
        Err(e) => {
            error!(error = %e, "payment batch aborted unexpectedly");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected error while processing the batch",
                Some(Value::String("sem detalhes".to_string())),
            )
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health.clone())
}

#[derive(Debug, Default, Deserialize)]
pub struct ReceiptQuery {
    #[serde(default)]
    pub download: Option<String>,
}

impl ReceiptQuery {
    fn wants_download(&self) -> bool {
        self.download
            .as_deref()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

/// `GET /comprovante/{id}`
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReceiptQuery>,
) -> Response {
    let Some(document) = state.receipts.get(&id).await else {
        return error_response(StatusCode::NOT_FOUND, "Comprovante não encontrado", None);
    };

    let disposition = format!(
        "{}; filename=\"{}\"",
        if query.wants_download() {
            "attachment"
        } else {
            "inline"
        },
        document.filename
    );

    (
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_flag() {
        let parse = |v: Option<&str>| ReceiptQuery {
            download: v.map(str::to_string),
        };
        assert!(parse(Some("true")).wants_download());
        assert!(parse(Some("TRUE")).wants_download());
        assert!(parse(Some("1")).wants_download());
        assert!(!parse(Some("false")).wants_download());
        assert!(!parse(None).wants_download());
    }

    #[test]
    fn test_batch_request_shape() {
        let request: PaymentBatchRequest = serde_json::from_str(
            r#"{"pagamentos": [{"valor": 10.50, "chave": "a@b.com"}, {"valor": 5.00, "chave": "bad-key"}]}"#,
        )
        .unwrap();
        let instructions = request.instructions();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[1].key, "bad-key");
    }

    #[test]
    fn test_batch_request_keeps_malformed_items() {
        let request: PaymentBatchRequest = serde_json::from_str(
            r#"{"pagamentos": [{"valor": 10.50, "chave": "a@b.com"}, {"valor": "abc", "chave": "c@d.com"}]}"#,
        )
        .unwrap();
        let instructions = request.instructions();
        assert!(instructions[0].malformed.is_none());
        assert!(instructions[1].malformed.is_some());
        assert_eq!(instructions[1].key, "c@d.com");
    }
}
