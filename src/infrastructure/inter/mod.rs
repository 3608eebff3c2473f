//! Adapters for the banking partner's API: token exchange and Pix payments.

pub mod oauth;
pub mod pix;

use reqwest::Response;
use serde_json::Value;

/// Reads an error body, keeping it as JSON when possible.
pub(crate) async fn error_details(response: Response) -> Option<Value> {
    let body = response.text().await.ok()?;
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}
