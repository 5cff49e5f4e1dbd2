//! Rate store trait and the in-memory implementation.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::debug;

use ratebook_common::{CurrencyCode, CurrencyRate, RateId, RatebookError, Result};

/// Durable table of currency rates keyed by code.
///
/// Each call is atomic. `insert` fails with `Conflict` when the code is
/// already present; `update` and `delete` fail with `NotFound` when it is
/// absent. Implementations do no validation beyond that; callers go through
/// [`crate::RateRegistry`].
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Get the store name.
    fn name(&self) -> &str;

    /// Point lookup by code.
    async fn find(&self, code: &CurrencyCode) -> Result<Option<CurrencyRate>>;

    /// Point lookup by identifier.
    async fn find_by_id(&self, id: RateId) -> Result<Option<CurrencyRate>>;

    /// Insert a new record and assign its identifier.
    async fn insert(&self, code: CurrencyCode, rate: Decimal) -> Result<CurrencyRate>;

    /// Overwrite the rate of an existing record.
    async fn update(&self, code: &CurrencyCode, rate: Decimal) -> Result<CurrencyRate>;

    /// Delete an existing record.
    async fn delete(&self, code: &CurrencyCode) -> Result<()>;

    /// Enumerate all records.
    async fn list(&self) -> Result<Vec<CurrencyRate>>;
}

/// Thread-safe in-memory rate store.
pub struct MemoryRateStore {
    rates: DashMap<CurrencyCode, CurrencyRate>,
    next_id: AtomicI64,
}

impl MemoryRateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rates: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find(&self, code: &CurrencyCode) -> Result<Option<CurrencyRate>> {
        Ok(self.rates.get(code).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: RateId) -> Result<Option<CurrencyRate>> {
        Ok(self
            .rates
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, code: CurrencyCode, rate: Decimal) -> Result<CurrencyRate> {
        match self.rates.entry(code) {
            Entry::Occupied(existing) => Err(RatebookError::Conflict(existing.key().to_string())),
            Entry::Vacant(slot) => {
                // Ids come from a counter that only grows, so deleted ids are never handed out again.
                let id = RateId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
                let record = CurrencyRate::new(id, slot.key().clone(), rate);
                slot.insert(record.clone());
                debug!(id = %id, code = %record.code, "Inserted rate");
                Ok(record)
            }
        }
    }

    async fn update(&self, code: &CurrencyCode, rate: Decimal) -> Result<CurrencyRate> {
        match self.rates.get_mut(code) {
            Some(mut record) => {
                record.rate = rate;
                Ok(record.value().clone())
            }
            None => Err(RatebookError::NotFound(code.to_string())),
        }
    }

    async fn delete(&self, code: &CurrencyCode) -> Result<()> {
        self.rates
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| RatebookError::NotFound(code.to_string()))
    }

    async fn list(&self) -> Result<Vec<CurrencyRate>> {
        let mut rates: Vec<CurrencyRate> = self.rates.iter().map(|r| r.value().clone()).collect();
        rates.sort_by_key(|r| r.id);
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryRateStore::new();
        let record = store.insert(code("EUR"), dec!(0.89)).await.unwrap();

        let found = store.find(&code("EUR")).await.unwrap().unwrap();
        assert_eq!(found, record);
        assert_eq!(store.find_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let store = MemoryRateStore::new();
        store.insert(code("EUR"), dec!(0.89)).await.unwrap();

        let result = store.insert(code("EUR"), dec!(0.90)).await;
        assert!(matches!(result, Err(RatebookError::Conflict(_))));
        assert_eq!(store.find(&code("EUR")).await.unwrap().unwrap().rate, dec!(0.89));
    }

    #[tokio::test]
    async fn test_ids_never_reused() {
        let store = MemoryRateStore::new();
        let first = store.insert(code("USD"), dec!(1)).await.unwrap();
        store.delete(&code("USD")).await.unwrap();
        let second = store.insert(code("USD"), dec!(1)).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = MemoryRateStore::new();

        assert!(matches!(
            store.update(&code("BRL"), dec!(4.82)).await,
            Err(RatebookError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&code("BRL")).await,
            Err(RatebookError::NotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_in_id_order() {
        let store = MemoryRateStore::new();
        for c in ["USD", "ARS", "EUR", "PHP", "BRL"] {
            store.insert(code(c), dec!(1)).await.unwrap();
        }

        let codes: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code.to_string())
            .collect();
        assert_eq!(codes, vec!["USD", "ARS", "EUR", "PHP", "BRL"]);
    }
}
