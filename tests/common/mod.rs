#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pix_gateway::application::orchestrator::BatchOrchestrator;
use pix_gateway::domain::instruction::PaymentInstruction;
use pix_gateway::domain::outcome::SubmittedPayment;
use pix_gateway::domain::ports::{
    Authenticator, Pacer, PacerBox, PaymentSubmitter, ReceiptPublisher, ReceiptRenderer,
};
use pix_gateway::domain::receipt::{ReceiptDocument, ReceiptLocator};
use pix_gateway::domain::token::AccessToken;
use pix_gateway::error::{AuthError, PaymentError, PublishError, RenderError};
use pix_gateway::infrastructure::pacing::NoPacing;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Number of calls each collaborator received.
#[derive(Default, Clone)]
pub struct Calls {
    pub auth: Arc<AtomicUsize>,
    pub submit: Arc<AtomicUsize>,
    pub render: Arc<AtomicUsize>,
    pub publish: Arc<AtomicUsize>,
    pub pauses: Arc<AtomicUsize>,
    pub submitted_keys: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct StubAuthenticator {
    pub calls: Calls,
    pub fail: bool,
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        self.calls.auth.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AuthError::Rejected {
                status: 401,
                details: Some(json!({"title": "invalid_client"})),
            })
        } else {
            Ok(AccessToken::new("stub-token", None))
        }
    }
}

/// Rejects keys containing "bad", accepts everything else.
pub struct ScriptedSubmitter {
    pub calls: Calls,
}

#[async_trait]
impl PaymentSubmitter for ScriptedSubmitter {
    async fn submit(
        &self,
        _token: &AccessToken,
        instruction: &PaymentInstruction,
    ) -> Result<SubmittedPayment, PaymentError> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        self.calls
            .submitted_keys
            .lock()
            .unwrap()
            .push(instruction.key.clone());

        if instruction.key.contains("bad") {
            return Err(PaymentError::Rejected {
                status: 400,
                details: Some(json!({"title": "Chave inválida"})),
            });
        }
        Ok(SubmittedPayment {
            idempotency_key: Uuid::new_v4(),
            key_type: instruction.resolved_key_type(),
            response: json!({"codigoSolicitacao": Uuid::new_v4().to_string()}),
        })
    }
}

/// Fails for keys containing "norender".
pub struct StubRenderer {
    pub calls: Calls,
}

impl ReceiptRenderer for StubRenderer {
    fn render(
        &self,
        instruction: &PaymentInstruction,
        _payment: &SubmittedPayment,
    ) -> Result<ReceiptDocument, RenderError> {
        self.calls.render.fetch_add(1, Ordering::SeqCst);
        if instruction.key.contains("norender") {
            return Err(RenderError::MissingField("valor"));
        }
        Ok(ReceiptDocument {
            bytes: b"%PDF-1.5 stub".to_vec(),
            filename: format!("comprovante-{}.pdf", instruction.key),
            content_type: "application/pdf".to_string(),
        })
    }
}

/// Fails for receipts of keys containing "nopublish".
pub struct StubPublisher {
    pub calls: Calls,
}

#[async_trait]
impl ReceiptPublisher for StubPublisher {
    async fn publish(&self, document: ReceiptDocument) -> Result<ReceiptLocator, PublishError> {
        self.calls.publish.fetch_add(1, Ordering::SeqCst);
        if document.filename.contains("nopublish") {
            return Err(PublishError::Upload {
                provider: "stub".to_string(),
                reason: "status 503".to_string(),
            });
        }
        let url = format!("https://cdn.test/{}", document.filename);
        Ok(ReceiptLocator {
            download_url: url.clone(),
            url,
            provider: "stub".to_string(),
        })
    }
}

pub struct CountingPacer {
    pub calls: Calls,
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.calls.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Orchestrator wired entirely with doubles sharing `calls`.
pub fn stub_orchestrator(calls: &Calls, auth_fails: bool) -> BatchOrchestrator {
    stub_orchestrator_with_pacer(calls, auth_fails, Box::new(NoPacing))
}

pub fn stub_orchestrator_with_pacer(
    calls: &Calls,
    auth_fails: bool,
    pacer: PacerBox,
) -> BatchOrchestrator {
    BatchOrchestrator::new(
        Box::new(StubAuthenticator {
            calls: calls.clone(),
            fail: auth_fails,
        }),
        Box::new(ScriptedSubmitter {
            calls: calls.clone(),
        }),
        Box::new(StubRenderer {
            calls: calls.clone(),
        }),
        Box::new(StubPublisher {
            calls: calls.clone(),
        }),
        pacer,
    )
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A request received by the fake bank.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub headers: HashMap<String, String>,
    pub body: Value,
}

#[derive(Default, Clone)]
pub struct FakeBank {
    pub token_requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub payments: Arc<Mutex<Vec<Recorded>>>,
    pub uploads: Arc<Mutex<Vec<Recorded>>>,
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect()
}

async fn token(
    State(bank): State<FakeBank>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let rejected = form.get("client_secret").map(String::as_str) == Some("wrong");
    bank.token_requests.lock().unwrap().push(form);
    if rejected {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"title": "invalid_client"})),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({"access_token": "tok-123", "token_type": "Bearer", "expires_in": 3600})),
        )
    }
}

async fn pix(
    State(bank): State<FakeBank>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = body["destinatario"]["chave"].as_str().unwrap_or_default().to_string();
    bank.payments.lock().unwrap().push(Recorded {
        headers: header_map(&headers),
        body,
    });
    if key == "bad-key" {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"title": "Chave inválida", "violacoes": []})),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({
                "codigoSolicitacao": Uuid::new_v4().to_string(),
                "tipoRetorno": "APROVACAO",
                "dataOperacao": "2024-06-15"
            })),
        )
    }
}

async fn storage(
    State(bank): State<FakeBank>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let path = body["path"].as_str().unwrap_or_default().to_string();
    bank.uploads.lock().unwrap().push(Recorded {
        headers: header_map(&headers),
        body,
    });
    Json(json!({"publicUrl": format!("https://cdn.test/{}", path)}))
}

async fn storage_down() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

impl FakeBank {
    pub fn router(&self) -> Router {
        Router::new()
            .route("/oauth/v2/token", post(token))
            .route("/banking/v2/pix", post(pix))
            .route("/storage", post(storage))
            .route("/storage-down", post(storage_down))
            .with_state(self.clone())
    }

    /// Starts the fake bank and returns its base URL.
    pub async fn start(&self) -> String {
        spawn(self.router()).await
    }
}
