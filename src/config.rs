//! Service configuration, assembled once at startup from flags and environment.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line flags, each with an environment fallback.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Batch Pix payment gateway", long_about = None)]
pub struct Cli {
    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// OAuth client id issued by the bank
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret issued by the bank
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth scope requested for payment submission
    #[arg(long, env = "INTER_SCOPE", default_value = "pagamento-pix.write")]
    pub scope: String,

    /// Checking account sent in the `x-conta-corrente` header
    #[arg(long, env = "CONTA_CORRENTE")]
    pub account: Option<String>,

    /// Base URL of the banking API
    #[arg(
        long,
        env = "INTER_API_URL",
        default_value = "https://cdpj.partners.bancointer.com.br"
    )]
    pub api_url: String,

    /// PEM client certificate for mutual TLS
    #[arg(long = "cert", env = "CERT_PATH", default_value = "./Inter API_Certificado.crt")]
    pub cert_path: PathBuf,

    /// PEM private key for mutual TLS
    #[arg(long = "key", env = "KEY_PATH", default_value = "./Inter API_Chave.key")]
    pub key_path: PathBuf,

    /// Skip verification of the bank's server certificate
    #[arg(long, env = "INTER_ACCEPT_INVALID_CERTS", default_value_t = false)]
    pub accept_invalid_certs: bool,

    /// Timeout applied to every outbound request, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Upload endpoint of the remote receipt storage
    #[arg(long, env = "STORAGE_URL")]
    pub storage_url: Option<String>,

    /// Bearer token for the remote receipt storage
    #[arg(long, env = "STORAGE_TOKEN", hide_env_values = true)]
    pub storage_token: Option<String>,

    /// Name reported for receipts uploaded to the remote storage
    #[arg(long, env = "STORAGE_PROVIDER", default_value = "remote")]
    pub storage_provider: String,

    /// Public base URL used for receipts served by this process
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Delay between two submissions of the same batch, in milliseconds (0 disables)
    #[arg(long, env = "PAYMENT_DELAY_MS", default_value_t = 500)]
    pub payment_delay_ms: u64,

    /// Lifetime of receipts kept in memory, in seconds
    #[arg(long, env = "RECEIPT_TTL_SECS", default_value_t = 3600)]
    pub receipt_ttl_secs: u64,

    /// Maximum number of receipts kept in memory
    #[arg(long, env = "RECEIPT_CACHE_CAPACITY", default_value_t = 256)]
    pub receipt_capacity: usize,

    #[arg(long, env = "SENDER_NAME", default_value = "Empresa Pagadora Ltda")]
    pub sender_name: String,

    #[arg(long, env = "SENDER_DOCUMENT", default_value = "00.000.000/0001-00")]
    pub sender_document: String,

    #[arg(long, env = "SENDER_INSTITUTION", default_value = "Banco Inter S.A.")]
    pub sender_institution: String,

    #[arg(long, env = "SENDER_AGENCY", default_value = "0001")]
    pub sender_agency: String,

    #[arg(long, env = "SENDER_ACCOUNT")]
    pub sender_account: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

/// Client credentials for the token exchange. Either half may be absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub token: Option<String>,
    pub provider: String,
}

/// Static identity of the paying institution printed on receipts.
#[derive(Debug, Clone, PartialEq)]
pub struct SenderIdentity {
    pub name: String,
    pub document: String,
    pub institution: String,
    pub agency: String,
    pub account: Option<String>,
}

impl Default for SenderIdentity {
    fn default() -> Self {
        Self {
            name: "Empresa Pagadora Ltda".to_string(),
            document: "00.000.000/0001-00".to_string(),
            institution: "Banco Inter S.A.".to_string(),
            agency: "0001".to_string(),
            account: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceiptCacheConfig {
    pub ttl: Duration,
    pub capacity: usize,
}

/// Everything the service needs, built once and handed to each component.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub api_url: String,
    pub account: Option<String>,
    pub credentials: Credentials,
    pub tls: TlsConfig,
    pub storage: Option<StorageConfig>,
    pub public_url: String,
    pub payment_delay: Duration,
    pub receipt_cache: ReceiptCacheConfig,
    pub sender: SenderIdentity,
    pub log_json: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<Cli> for GatewayConfig {
    fn from(cli: Cli) -> Self {
        let account = non_blank(cli.account);
        let storage = non_blank(cli.storage_url).map(|url| StorageConfig {
            url,
            token: non_blank(cli.storage_token),
            provider: cli.storage_provider,
        });
        let public_url = non_blank(cli.public_url)
            .unwrap_or_else(|| format!("http://localhost:{}", cli.port))
            .trim_end_matches('/')
            .to_string();

        Self {
            port: cli.port,
            api_url: cli.api_url.trim_end_matches('/').to_string(),
            credentials: Credentials {
                client_id: non_blank(cli.client_id),
                client_secret: non_blank(cli.client_secret),
                scope: cli.scope,
            },
            tls: TlsConfig {
                cert_path: cli.cert_path,
                key_path: cli.key_path,
                accept_invalid_certs: cli.accept_invalid_certs,
                timeout: Duration::from_secs(cli.http_timeout_secs),
            },
            storage,
            public_url,
            payment_delay: Duration::from_millis(cli.payment_delay_ms),
            receipt_cache: ReceiptCacheConfig {
                ttl: Duration::from_secs(cli.receipt_ttl_secs),
                capacity: cli.receipt_capacity,
            },
            sender: SenderIdentity {
                name: cli.sender_name,
                document: cli.sender_document,
                institution: cli.sender_institution,
                agency: cli.sender_agency,
                account: non_blank(cli.sender_account).or_else(|| account.clone()),
            },
            account,
            log_json: cli.log_json,
        }
    }
}
