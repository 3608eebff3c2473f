use std::fmt;
use std::time::{Duration, Instant};

/// Bearer token obtained once per batch. Never persisted or shared across batches.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    obtained_at: Instant,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: value.into(),
            obtained_at: Instant::now(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn is_expired(&self) -> bool {
        self.expires_in
            .is_some_and(|ttl| self.obtained_at.elapsed() >= ttl)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::new("super-secret", None);
        let printed = format!("{:?}", token);
        assert!(!printed.contains("super-secret"));
        assert_eq!(token.secret(), "super-secret");
    }

    #[test]
    fn test_expiry() {
        assert!(!AccessToken::new("t", None).is_expired());
        assert!(AccessToken::new("t", Some(Duration::ZERO)).is_expired());
        assert!(!AccessToken::new("t", Some(Duration::from_secs(3600))).is_expired());
    }
}
