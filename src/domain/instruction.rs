use super::pix_key::{KeyType, classify_key};
use crate::error::PaymentError;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description sent to the provider when the instruction carries none.
pub const DEFAULT_DESCRIPTION: &str = "Pagamento Pix via API";

/// A positive monetary amount in BRL, kept to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded > Decimal::ZERO {
            Ok(Self(rounded))
        } else {
            Err(PaymentError::InvalidInstruction(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Two-decimal string as expected by the payment API, e.g. `"5.00"`.
    pub fn to_wire(&self) -> String {
        let mut value = self.0;
        value.rescale(2);
        value.to_string()
    }
}

/// One item of a payment batch, as received from the client.
///
/// Items are decoded one at a time with [`PaymentInstruction::from_json`], so a
/// malformed item only fails itself instead of rejecting the whole batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentInstruction {
    #[serde(rename = "valor", default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "chave", default)]
    pub key: String,
    #[serde(rename = "tipoChave", default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyType>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "dataPagamento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_date: Option<NaiveDate>,
    /// Why the item could not be decoded, if it could not.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl PaymentInstruction {
    pub fn new(amount: Decimal, key: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            key: key.into(),
            ..Self::default()
        }
    }

    /// Decodes one batch item. An item that does not decode is kept, marked
    /// as malformed, so it can be reported in its position.
    pub fn from_json(item: Value) -> Self {
        match serde_json::from_value::<Self>(item.clone()) {
            Ok(instruction) => instruction,
            Err(e) => Self {
                key: raw_key(&item),
                malformed: Some(e.to_string()),
                ..Self::default()
            },
        }
    }

    /// Checks that the item decoded and carries a usable amount and key.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if let Some(reason) = &self.malformed {
            return Err(PaymentError::InvalidInstruction(reason.clone()));
        }
        self.amount()?;
        self.recipient_key()?;
        Ok(())
    }

    /// Validated amount of this instruction.
    pub fn amount(&self) -> Result<Amount, PaymentError> {
        match self.amount {
            Some(value) => Amount::new(value),
            None => Err(PaymentError::InvalidInstruction(
                "Amount is missing".to_string(),
            )),
        }
    }

    /// Recipient key with surrounding whitespace removed, rejecting empty keys.
    pub fn recipient_key(&self) -> Result<&str, PaymentError> {
        let key = self.key.trim();
        if key.is_empty() {
            Err(PaymentError::InvalidInstruction(
                "Pix key is missing".to_string(),
            ))
        } else {
            Ok(key)
        }
    }

    /// Declared key type, or the one inferred from the key shape.
    pub fn resolved_key_type(&self) -> KeyType {
        self.key_type.unwrap_or_else(|| classify_key(&self.key))
    }

    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => DEFAULT_DESCRIPTION,
        }
    }

    /// Scheduled date, or `today` when none was given.
    pub fn payment_date(&self, today: NaiveDate) -> NaiveDate {
        self.scheduled_date.unwrap_or(today)
    }
}

/// `chave` of an undecodable item, rendered as text for the report.
fn raw_key(item: &Value) -> String {
    match item.get("chave") {
        Some(Value::String(key)) => key.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
