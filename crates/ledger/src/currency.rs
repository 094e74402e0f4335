use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Validated currency code: three ASCII letters, stored uppercase.
///
/// Balances in different currencies never mix; the code is part of every
/// balance key. Input is normalized, so `"usd"` and `"USD"` name the same
/// ledger.
///
/// # Examples
///
/// ```rust
/// use ledger::Currency;
///
/// let currency = Currency::try_from("usd").unwrap();
/// assert_eq!(currency.code(), "USD");
/// assert!(Currency::try_from("US").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Returns the canonical three-letter code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LedgerError::InvalidCurrency(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Currency {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        assert_eq!(Currency::try_from("eur").unwrap().code(), "EUR");
        assert_eq!(Currency::try_from(" GBP ").unwrap().code(), "GBP");
    }

    #[test]
    fn rejects_invalid_codes() {
        assert!(Currency::try_from("").is_err());
        assert!(Currency::try_from("EU").is_err());
        assert!(Currency::try_from("EURO").is_err());
        assert!(Currency::try_from("E1R").is_err());
    }
}
