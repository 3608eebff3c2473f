use super::handlers::{health, pay, receipt};
use super::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/pagar", post(pay))
        .route("/health", get(health))
        .route("/comprovante/{id}", get(receipt))
        .with_state(state)
}
