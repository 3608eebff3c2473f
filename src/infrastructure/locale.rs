use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Brasília time, UTC-03:00. Brazil has not observed daylight saving since 2019.
const BRASILIA: FixedOffset = match FixedOffset::west_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC-03:00 is within a day"),
};

pub fn brasilia() -> FixedOffset {
    BRASILIA
}

pub fn now_in_brasilia() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&brasilia())
}

/// Processing date used when an instruction has no scheduled date.
pub fn today_in_brasilia() -> NaiveDate {
    now_in_brasilia().date_naive()
}

pub fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats an amount the Brazilian way, e.g. `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}R$ {},{}", sign, grouped, cents)
}
