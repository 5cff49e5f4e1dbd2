//! Identifier types for Ratebook entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RatebookError, Result};

/// Surrogate identifier of a registered rate.
/// Assigned by the store on creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RateId(i64);

impl RateId {
    /// Create from a raw store identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RateId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// ISO 4217 style currency code, always three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Required code length.
    pub const LEN: usize = 3;

    /// Parse and normalize a currency code.
    pub fn parse(code: &str) -> Result<Self> {
        if code.chars().count() != Self::LEN {
            return Err(RatebookError::validation(
                "code",
                format!("'{}' must be {} characters long", code, Self::LEN),
            ));
        }

        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RatebookError::validation(
                "code",
                format!("'{}' must contain only letters", code),
            ));
        }

        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = RatebookError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RatebookError;

    fn try_from(value: String) -> Result<Self> {
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
    fn test_code_normalized_to_uppercase() {
        let code = CurrencyCode::parse("eur").unwrap();
        assert_eq!(code.as_str(), "EUR");
        assert_eq!(code, CurrencyCode::parse("EuR").unwrap());
    }

    #[test]
    fn test_code_length() {
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("USDT").is_err());
        assert!(CurrencyCode::parse("").is_err());
        assert!(CurrencyCode::parse("USD ").is_err());
    }

    #[test]
    fn test_code_rejects_non_letters() {
        let err = CurrencyCode::parse("U$D").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(CurrencyCode::parse("123").is_err());
    }

    #[test]
    fn test_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"php\"").unwrap();
        assert_eq!(code.as_str(), "PHP");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"PHP\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"PHPX\"").is_err());
    }

    #[test]
    fn test_rate_id_ordering() {
        assert!(RateId::new(1) < RateId::new(2));
        assert_eq!(RateId::from(7).to_string(), "7");
    }
}
