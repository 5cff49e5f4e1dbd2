//! Monetary types for Ratebook.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RatebookError, Result};
use crate::identifiers::{CurrencyCode, RateId};

/// Decimal places of every converted amount.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// A registered exchange rate.
///
/// `rate` is expressed as units of `code` per one unit of the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Store-assigned identifier.
    pub id: RateId,
    /// Currency code, unique across live records.
    pub code: CurrencyCode,
    /// Units of this currency per one unit of the base currency.
    pub rate: Decimal,
}

impl CurrencyRate {
    /// Create a new rate record.
    pub fn new(id: RateId, code: CurrencyCode, rate: Decimal) -> Self {
        Self { id, code, rate }
    }
}

impl fmt::Display for CurrencyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CurrencyId: {} - CurrencyCode: {} - ExchangeRate: {}",
            self.id,
            self.code,
            self.rate.normalize()
        )
    }
}

/// Reject negative rates.
pub fn ensure_rate(rate: Decimal) -> Result<Decimal> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(RatebookError::validation(
            "rate",
            format!("{} must not be negative", rate),
        ));
    }
    Ok(rate)
}

/// Reject negative amounts.
pub fn ensure_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RatebookError::validation(
            "amount",
            format!("{} must not be negative", amount),
        ));
    }
    Ok(amount)
}

/// Round an amount to two decimal places, half away from zero.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Rebase `amount` units of the `from` currency into units of the `to`
/// currency through the shared base: `round(amount * (to_rate / from_rate), 2)`.
pub fn rebase(
    amount: Decimal,
    from: &CurrencyCode,
    from_rate: Decimal,
    to_rate: Decimal,
) -> Result<Decimal> {
    if from_rate.is_zero() {
        return Err(RatebookError::invalid_rate(
            from.as_str(),
            "rate is zero, conversion is undefined",
        ));
    }

    let cross = to_rate
        .checked_div(from_rate)
        .ok_or_else(|| RatebookError::invalid_rate(from.as_str(), "cross rate overflow"))?;
    let value = amount
        .checked_mul(cross)
        .ok_or_else(|| RatebookError::invalid_rate(from.as_str(), "converted amount overflow"))?;

    Ok(round_amount(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_amount(dec("1.005")), dec("1.01"));
        assert_eq!(round_amount(dec("1.004")), dec("1.00"));
        assert_eq!(round_amount(dec("2.675")), dec("2.68"));
        assert_eq!(round_amount(dec("-1.005")), dec("-1.01"));
    }

    #[test]
    fn test_rebase_examples() {
        let usd_to_eur = rebase(dec("100"), &code("USD"), dec("1"), dec("0.89")).unwrap();
        assert_eq!(usd_to_eur, dec("89.00"));

        let ars_to_usd = rebase(dec("7000"), &code("ARS"), dec("69.5"), dec("1")).unwrap();
        assert_eq!(ars_to_usd, dec("100.72"));
    }

    #[test]
    fn test_rebase_same_rate_is_identity() {
        let value = rebase(dec("12.345"), &code("PHP"), dec("43.1232"), dec("43.1232")).unwrap();
        assert_eq!(value, dec("12.35"));
    }

    #[test]
    fn test_rebase_zero_from_rate() {
        let err = rebase(dec("10"), &code("XAU"), Decimal::ZERO, dec("1")).unwrap_err();
        assert!(matches!(err, RatebookError::InvalidRate { ref code, .. } if code == "XAU"));
    }

    #[test]
    fn test_rebase_zero_to_rate() {
        let value = rebase(dec("10"), &code("USD"), dec("1"), Decimal::ZERO).unwrap();
        assert!(value.is_zero());
    }

    #[test]
    fn test_ensure_rate_and_amount() {
        assert!(ensure_rate(Decimal::ZERO).is_ok());
        assert!(ensure_rate(dec("0.89")).is_ok());
        assert!(ensure_rate(dec("-0.01")).is_err());
        assert!(ensure_amount(dec("-1")).is_err());
        assert!(ensure_amount(dec("-0")).is_ok());
    }

    #[test]
    fn test_display() {
        let rate = CurrencyRate::new(RateId::new(2), code("ars"), dec("69.50"));
        assert_eq!(
            rate.to_string(),
            "CurrencyId: 2 - CurrencyCode: ARS - ExchangeRate: 69.5"
        );
    }
}
