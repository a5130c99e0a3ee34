//! Currency code model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::errors::WalletError;

/// Currency every valuation is reported in. Provider rates are PLN per unit.
pub const HOME_CURRENCY: &str = "PLN";

/// A three-letter, uppercase, ISO-4217-shaped currency code.
///
/// Input is case-normalized on parse, so `"usd"` and `"USD"` name the same
/// wallet entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        if raw.chars().count() != 3 {
            return Err(WalletError::Validation(format!(
                "Currency code must be exactly 3 letters, got '{}'",
                raw
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(WalletError::Validation(format!(
                "Currency code must contain only letters, got '{}'",
                raw
            )));
        }

        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        assert_eq!(CurrencyCode::parse("usd").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse("eUr").unwrap().as_str(), "EUR");
        assert_eq!(
            CurrencyCode::parse("usd").unwrap(),
            CurrencyCode::parse("USD").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for raw in ["", "US", "USDT", "U$D", "12A", " usd", "usd "] {
            assert!(
                matches!(CurrencyCode::parse(raw), Err(WalletError::Validation(_))),
                "expected '{}' to be rejected",
                raw
            );
        }
    }
}
