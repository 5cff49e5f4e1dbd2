//! Validated CRUD over the rate store.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use ratebook_common::{ensure_rate, CurrencyCode, CurrencyRate, RateId, RatebookError, Result};

use crate::store::RateStore;

/// Rates registered by [`RateRegistry::seed`] on an empty store.
pub fn default_rates() -> Vec<(&'static str, Decimal)> {
    vec![
        ("USD", Decimal::ONE),
        ("ARS", Decimal::new(6950, 2)),
        ("EUR", Decimal::new(89, 2)),
        ("PHP", Decimal::new(431232, 4)),
        ("BRL", Decimal::new(482, 2)),
    ]
}

/// The rate registry keeps the store well-formed: codes are validated,
/// normalized and unique, rates are never negative.
///
/// Validation always runs before the store is touched, so a rejected call
/// leaves the store exactly as it was.
pub struct RateRegistry {
    store: Arc<dyn RateStore>,
}

impl RateRegistry {
    /// Create a registry over the given store.
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    /// Get the store name.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Register a new currency rate and return its identifier.
    #[instrument(skip(self))]
    pub async fn add_rate(&self, code: &str, rate: Decimal) -> Result<RateId> {
        let code = CurrencyCode::parse(code)?;
        let rate = ensure_rate(rate)?;

        let record = self.store.insert(code, rate).await?;

        info!(
            id = %record.id,
            code = %record.code,
            rate = %record.rate,
            "Rate registered"
        );

        Ok(record.id)
    }

    /// Overwrite the rate of a registered currency.
    #[instrument(skip(self))]
    pub async fn update_rate(&self, code: &str, rate: Decimal) -> Result<CurrencyRate> {
        let rate = ensure_rate(rate)?;
        let code = Self::registered_code(code)?;

        let record = self.store.update(&code, rate).await?;

        info!(code = %record.code, rate = %record.rate, "Rate updated");

        Ok(record)
    }

    /// Remove a registered currency.
    #[instrument(skip(self))]
    pub async fn remove_rate(&self, code: &str) -> Result<()> {
        let code = Self::registered_code(code)?;

        self.store.delete(&code).await?;

        info!(code = %code, "Rate removed");

        Ok(())
    }

    /// Look up a currency by code. `None` when it is not registered.
    pub async fn get_rate(&self, code: &str) -> Result<Option<CurrencyRate>> {
        match CurrencyCode::parse(code) {
            Ok(code) => self.store.find(&code).await,
            Err(_) => Ok(None),
        }
    }

    /// Look up a currency by identifier.
    pub async fn get_rate_by_id(&self, id: RateId) -> Result<Option<CurrencyRate>> {
        self.store.find_by_id(id).await
    }

    /// List all registered currencies in store order.
    pub async fn list_rates(&self) -> Result<Vec<CurrencyRate>> {
        self.store.list().await
    }

    /// Register `rates` if the registry is empty. Returns how many were added.
    #[instrument(skip(self, rates), fields(count = rates.len()))]
    pub async fn seed(&self, rates: &[(&str, Decimal)]) -> Result<usize> {
        if !self.store.list().await?.is_empty() {
            debug!("Registry already populated, skipping seed");
            return Ok(0);
        }

        for (code, rate) in rates {
            self.add_rate(code, *rate).await?;
        }

        info!(seeded = rates.len(), "Registry seeded");
        Ok(rates.len())
    }

    /// A code that fails validation can never have been registered.
    fn registered_code(code: &str) -> Result<CurrencyCode> {
        CurrencyCode::parse(code).map_err(|_| RatebookError::NotFound(code.to_uppercase()))
    }
}
