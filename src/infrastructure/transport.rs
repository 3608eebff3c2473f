use crate::config::TlsConfig;
use crate::error::{GatewayError, Result};
use reqwest::{Client, Identity};
use std::path::Path;
use tracing::{info, warn};

fn read_pem(what: &'static str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| GatewayError::MissingFile {
        what,
        path: path.display().to_string(),
        source,
    })
}

/// Builds the HTTP client shared by the token exchange and payment submission.
///
/// The client presents the configured certificate and key to the server
/// (mutual TLS). Both files are read once here.
pub fn mtls_client(tls: &TlsConfig) -> Result<Client> {
    let mut pem = read_pem("client certificate", &tls.cert_path)?;
    let key = read_pem("client private key", &tls.key_path)?;
    if !pem.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend_from_slice(&key);

    let identity = Identity::from_pem(&pem).map_err(GatewayError::Identity)?;

    if tls.accept_invalid_certs {
        warn!("server certificate verification is disabled for the banking API");
    }

    let client = Client::builder()
        .use_rustls_tls()
        .identity(identity)
        .danger_accept_invalid_certs(tls.accept_invalid_certs)
        .timeout(tls.timeout)
        .build()
        .map_err(GatewayError::Transport)?;

    info!(cert = %tls.cert_path.display(), "mutual TLS client ready");
    Ok(client)
}

/// Plain client for endpoints that do not take a client certificate.
pub fn plain_client(tls: &TlsConfig) -> Result<Client> {
    Client::builder()
        .use_rustls_tls()
        .timeout(tls.timeout)
        .build()
        .map_err(GatewayError::Transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn tls(cert: &Path, key: &Path) -> TlsConfig {
        TlsConfig {
            cert_path: cert.to_path_buf(),
            key_path: key.to_path_buf(),
            accept_invalid_certs: false,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_missing_certificate_is_reported() {
        let key = NamedTempFile::new().unwrap();
        let config = tls(Path::new("/nonexistent/cert.crt"), key.path());

        let err = mtls_client(&config).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MissingFile {
                what: "client certificate",
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_identity_is_rejected() {
        let mut cert = NamedTempFile::new().unwrap();
        writeln!(cert, "not a certificate").unwrap();
        let mut key = NamedTempFile::new().unwrap();
        writeln!(key, "not a key").unwrap();

        let err = mtls_client(&tls(cert.path(), key.path())).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Identity(_) | GatewayError::Transport(_)
        ));
    }

    #[test]
    fn test_plain_client_builds() {
        let config = tls(Path::new("unused"), Path::new("unused"));
        assert!(plain_client(&config).is_ok());
    }
}
