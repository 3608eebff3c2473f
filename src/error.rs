use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

/// Failure to obtain an access token. Aborts the whole batch.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("client credentials are not configured ({0} missing)")]
    MissingCredentials(&'static str),
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token endpoint returned status {status}")]
    Rejected { status: u16, details: Option<Value> },
    #[error("token response is malformed: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// Provider error body, when the endpoint returned one.
    pub fn details(&self) -> Option<&Value> {
        match self {
            AuthError::Rejected { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

/// Failure of a single payment submission. Recorded per item, never batch-fatal.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("invalid payment instruction: {0}")]
    InvalidInstruction(String),
    #[error("payment endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment rejected with status {status}")]
    Rejected { status: u16, details: Option<Value> },
}

impl PaymentError {
    pub fn details(&self) -> Option<&Value> {
        match self {
            PaymentError::Rejected { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("receipt field `{0}` is missing")]
    MissingField(&'static str),
    #[error("receipt encoding failed: {0}")]
    Encoding(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("upload to {provider} failed: {reason}")]
    Upload { provider: String, reason: String },
    #[error("upload transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors raised while assembling the service at startup.
#[derive(Error, Diagnostic, Debug)]
pub enum GatewayError {
    #[error("cannot read {what} at {path}")]
    #[diagnostic(
        code(pix_gateway::config::missing_file),
        help("point CERT_PATH / KEY_PATH at the PEM files issued for the banking API")
    )]
    MissingFile {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid client identity: {0}")]
    #[diagnostic(
        code(pix_gateway::config::identity),
        help("the certificate and private key must both be PEM encoded")
    )]
    Identity(#[source] reqwest::Error),
    #[error("HTTP client setup failed: {0}")]
    #[diagnostic(code(pix_gateway::transport))]
    Transport(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
