use serde::{Deserialize, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A rendered receipt, ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Where a published receipt can be retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLocator {
    pub url: String,
    pub download_url: String,
    pub provider: String,
}
