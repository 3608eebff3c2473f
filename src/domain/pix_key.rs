use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid uuid regex")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+55|55)?\d{10,11}$").expect("valid phone regex"));

/// How a Pix recipient is addressed.
///
/// Serialized with its wire name. Parsing is case-insensitive and accepts a
/// few historical aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyType {
    /// Individual taxpayer number, 11 digits.
    #[serde(rename = "CPF")]
    Cpf,
    /// Company taxpayer number, 14 digits.
    #[serde(rename = "CNPJ")]
    Cnpj,
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "TELEFONE")]
    Phone,
    /// Randomly generated key (UUID shaped).
    #[serde(rename = "EVP")]
    Random,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Cpf => "CPF",
            KeyType::Cnpj => "CNPJ",
            KeyType::Email => "EMAIL",
            KeyType::Phone => "TELEFONE",
            KeyType::Random => "EVP",
        }
    }

    /// Human readable label used on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            KeyType::Cpf => "CPF",
            KeyType::Cnpj => "CNPJ",
            KeyType::Email => "E-mail",
            KeyType::Phone => "Telefone",
            KeyType::Random => "Chave aleatória",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CPF" => Ok(KeyType::Cpf),
            "CNPJ" => Ok(KeyType::Cnpj),
            "EMAIL" | "E-MAIL" => Ok(KeyType::Email),
            "TELEFONE" | "PHONE" => Ok(KeyType::Phone),
            "EVP" | "ALEATORIA" | "CHAVE_ALEATORIA" => Ok(KeyType::Random),
            other => Err(format!("unknown key type `{}`", other)),
        }
    }
}

impl<'de> Deserialize<'de> for KeyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Infers the key type from the shape of the key. Falls back to CPF.
pub fn classify_key(key: &str) -> KeyType {
    let key = key.trim();

    if UUID.is_match(key) {
        return KeyType::Random;
    }
    if EMAIL.is_match(key) {
        return KeyType::Email;
    }

    if let Some(digits) = document_digits(key) {
        match digits.len() {
            11 => return KeyType::Cpf,
            14 => return KeyType::Cnpj,
            _ => {}
        }
    }

    if PHONE.is_match(key) {
        return KeyType::Phone;
    }

    KeyType::Cpf
}

/// Digits of a document number written with optional `.`, `-` or `/` separators.
fn document_digits(key: &str) -> Option<String> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/'))
    {
        return None;
    }
    Some(key.chars().filter(char::is_ascii_digit).collect())
}

/// Masks a document-number key for display. Other key types pass through.
pub fn mask_key(key: &str, key_type: KeyType) -> String {
    let digits = document_digits(key.trim());
    match (key_type, digits) {
        (KeyType::Cpf, Some(d)) if d.len() == 11 => {
            format!("***.{}.{}-**", &d[3..6], &d[6..9])
        }
        (KeyType::Cnpj, Some(d)) if d.len() == 14 => {
            format!("**.{}.{}/****-**", &d[2..5], &d[5..8])
        }
        _ => key.to_string(),
    }
}
