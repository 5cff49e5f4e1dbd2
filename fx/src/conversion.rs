//! Currency conversion types.

use chrono::{DateTime, Utc};
use ratebook_common::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::RateSourceKind;

/// Represents a completed currency conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Currency converted from.
    pub from: CurrencyCode,
    /// Currency converted to.
    pub to: CurrencyCode,
    /// Input amount, in units of `from`.
    pub amount: Decimal,
    /// Rate of `from` against the base currency.
    pub from_rate: Decimal,
    /// Rate of `to` against the base currency.
    pub to_rate: Decimal,
    /// Output amount, in units of `to`, rounded to two decimals.
    pub converted: Decimal,
    /// Where both rates came from.
    pub source: RateSourceKind,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Create a new conversion record.
    pub fn new(
        from: CurrencyCode,
        to: CurrencyCode,
        amount: Decimal,
        from_rate: Decimal,
        to_rate: Decimal,
        converted: Decimal,
        source: RateSourceKind,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            from,
            to,
            amount,
            from_rate,
            to_rate,
            converted,
            source,
            executed_at: Utc::now(),
        }
    }

    /// Get the effective rate after rounding.
    pub fn effective_rate(&self) -> Decimal {
        if self.amount.is_zero() {
            return Decimal::ZERO;
        }
        self.converted / self.amount
    }
}

/// Request to perform a conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Currency code to convert from.
    pub from: String,
    /// Currency code to convert to.
    pub to: String,
    /// Amount to convert.
    pub amount: Decimal,
    /// Which source to resolve both rates from.
    pub source: RateSourceKind,
}

impl ConversionRequest {
    /// Create a new conversion request against the local registry.
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            source: RateSourceKind::Local,
        }
    }

    /// Resolve rates from the quote service.
    pub fn remote(mut self) -> Self {
        self.source = RateSourceKind::Remote;
        self
    }

    /// Pick the source from the caller's "use remote" flag.
    pub fn with_remote(mut self, use_remote: bool) -> Self {
        self.source = RateSourceKind::from_remote_flag(use_remote);
        self
    }
}
