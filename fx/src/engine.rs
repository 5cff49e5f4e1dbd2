//! Conversion engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use ratebook_common::{ensure_amount, rebase, CurrencyCode, Result};

use crate::cancel::CancelSignal;
use crate::conversion::{Conversion, ConversionRequest};
use crate::resolver::RateResolver;

/// Converts amounts between currencies by rebasing through the base
/// currency. Source-agnostic: the resolver decides where rates come from.
pub struct ConversionEngine {
    resolver: Arc<RateResolver>,
}

impl ConversionEngine {
    /// Create a new engine over the resolver.
    pub fn new(resolver: Arc<RateResolver>) -> Self {
        Self { resolver }
    }

    /// Convert `amount` units of `from` into units of `to`, rounded to two
    /// decimals half away from zero.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        use_remote: bool,
    ) -> Result<Decimal> {
        let request = ConversionRequest::new(from, to, amount).with_remote(use_remote);
        let conversion = self.convert_request(request).await?;
        Ok(conversion.converted)
    }

    /// Convert and return the full conversion record.
    #[instrument(skip(self, request), fields(
        from = %request.from,
        to = %request.to,
        amount = %request.amount,
        source = %request.source
    ))]
    pub async fn convert_request(&self, request: ConversionRequest) -> Result<Conversion> {
        let amount = ensure_amount(request.amount)?;

        // Two independent lookups; the first failure is returned as is.
        let from_rate = self.resolver.resolve_from(&request.from, request.source).await?;
        let to_rate = self.resolver.resolve_from(&request.to, request.source).await?;

        let from = CurrencyCode::parse(&request.from)?;
        let to = CurrencyCode::parse(&request.to)?;
        let converted = rebase(amount, &from, from_rate, to_rate)?;

        let conversion = Conversion::new(
            from,
            to,
            amount,
            from_rate,
            to_rate,
            converted,
            request.source,
        );

        info!(
            conversion_id = %conversion.id,
            converted = %conversion.converted,
            "Conversion completed"
        );

        Ok(conversion)
    }

    /// Convert unless `cancel` fires first.
    pub async fn convert_with_cancel(
        &self,
        request: ConversionRequest,
        cancel: &CancelSignal,
    ) -> Result<Conversion> {
        cancel.run(self.convert_request(request)).await
    }
}
