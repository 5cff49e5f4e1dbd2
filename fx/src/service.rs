//! Exchange service: the public surface over registry, resolver and engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use ratebook_common::{CurrencyCode, CurrencyRate, RateId, Result};
use ratebook_registry::{default_rates, RateRegistry, RateStore, SqliteRateStore};

use crate::cancel::CancelSignal;
use crate::config::ExchangeConfig;
use crate::conversion::{Conversion, ConversionRequest};
use crate::engine::ConversionEngine;
use crate::provider::{LocalRateSource, RemoteRateSource};
use crate::quote::{HttpQuoteClient, QuoteClient};
use crate::resolver::RateResolver;

/// Rate registry plus conversion, wired from explicit configuration.
///
/// Holds no state of its own beyond what the rate store persists.
pub struct ExchangeService {
    registry: Arc<RateRegistry>,
    resolver: Arc<RateResolver>,
    engine: ConversionEngine,
}

impl ExchangeService {
    /// Build the service from injected store and quote client handles.
    pub fn new(
        store: Arc<dyn RateStore>,
        quotes: Arc<dyn QuoteClient>,
        base_currency: CurrencyCode,
    ) -> Self {
        let registry = Arc::new(RateRegistry::new(store));
        let resolver = Arc::new(RateResolver::new(
            Arc::new(LocalRateSource::new(registry.clone())),
            Arc::new(RemoteRateSource::new(quotes, base_currency)),
        ));
        let engine = ConversionEngine::new(resolver.clone());

        Self {
            registry,
            resolver,
            engine,
        }
    }

    /// Open the SQLite store and HTTP quote client named by `config`.
    pub async fn connect(config: &ExchangeConfig) -> Result<Self> {
        config.validate()?;

        let store = SqliteRateStore::connect(&config.store).await?;
        let quotes = HttpQuoteClient::new(&config.quote)?;
        let base = config.quote.base_currency()?;

        info!(
            database_url = %config.store.database_url,
            quote_url = %config.quote.base_url,
            base_currency = %base,
            "Exchange service ready"
        );

        Ok(Self::new(Arc::new(store), Arc::new(quotes), base))
    }

    /// Get the rate registry.
    pub fn registry(&self) -> &Arc<RateRegistry> {
        &self.registry
    }

    /// Get the rate resolver.
    pub fn resolver(&self) -> &Arc<RateResolver> {
        &self.resolver
    }

    pub async fn add_rate(&self, code: &str, rate: Decimal) -> Result<RateId> {
        self.registry.add_rate(code, rate).await
    }

    pub async fn update_rate(&self, code: &str, rate: Decimal) -> Result<CurrencyRate> {
        self.registry.update_rate(code, rate).await
    }

    pub async fn remove_rate(&self, code: &str) -> Result<()> {
        self.registry.remove_rate(code).await
    }

    pub async fn get_rate(&self, code: &str) -> Result<Option<CurrencyRate>> {
        self.registry.get_rate(code).await
    }

    pub async fn get_rate_by_id(&self, id: RateId) -> Result<Option<CurrencyRate>> {
        self.registry.get_rate_by_id(id).await
    }

    pub async fn list_rates(&self) -> Result<Vec<CurrencyRate>> {
        self.registry.list_rates().await
    }

    /// Register the default rates if the registry is empty.
    pub async fn seed_defaults(&self) -> Result<usize> {
        self.registry.seed(&default_rates()).await
    }

    pub async fn resolve(&self, code: &str, use_remote: bool) -> Result<Decimal> {
        self.resolver.resolve(code, use_remote).await
    }

    pub async fn resolve_with_cancel(
        &self,
        code: &str,
        use_remote: bool,
        cancel: &CancelSignal,
    ) -> Result<Decimal> {
        self.resolver.resolve_with_cancel(code, use_remote, cancel).await
    }

    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        use_remote: bool,
    ) -> Result<Decimal> {
        self.engine.convert(from, to, amount, use_remote).await
    }

    pub async fn convert_request(&self, request: ConversionRequest) -> Result<Conversion> {
        self.engine.convert_request(request).await
    }

    pub async fn convert_with_cancel(
        &self,
        request: ConversionRequest,
        cancel: &CancelSignal,
    ) -> Result<Conversion> {
        self.engine.convert_with_cancel(request, cancel).await
    }
}
