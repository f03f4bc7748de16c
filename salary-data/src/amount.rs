use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error, PartialEq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Trims whitespace and removes commas (thousands separator).
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a salary amount typed by a person.
///
/// Handles comma as thousands separator (e.g. `"2,304.50"`) and surrounding
/// whitespace. Unlike CSV cells, empty input is an error: an amount is always
/// required. Sign is preserved so the engine can reject negatives itself.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|source| {
        tracing::debug!(input = %s, "rejected amount");
        ParseAmountError::Invalid {
            input: s.to_string(),
            source,
        }
    })
}
