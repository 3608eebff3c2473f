//! HTTP surface: batch payment submission, health and locally served receipts.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_routes;
pub use state::{AppState, HealthStatus};
