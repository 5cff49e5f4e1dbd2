//! Rate sources: the local registry and the remote quote service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ratebook_common::{CurrencyCode, RatebookError, Result};
use ratebook_registry::RateRegistry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::quote::{LatestRates, QuoteClient};

/// Which rate source to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSourceKind {
    /// The persisted rate registry.
    Local,
    /// The live quote service.
    Remote,
}

impl RateSourceKind {
    /// Map the caller's "use remote" flag.
    pub fn from_remote_flag(use_remote: bool) -> Self {
        if use_remote {
            RateSourceKind::Remote
        } else {
            RateSourceKind::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateSourceKind::Local => "local",
            RateSourceKind::Remote => "remote",
        }
    }
}

impl fmt::Display for RateSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source of exchange rates against the base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source kind.
    fn kind(&self) -> RateSourceKind;

    /// Get the source name.
    fn name(&self) -> &str;

    /// Get the rate of `code` against the base currency.
    async fn rate_for(&self, code: &str) -> Result<Decimal>;
}

/// Reads rates from the rate registry.
pub struct LocalRateSource {
    registry: Arc<RateRegistry>,
}

impl LocalRateSource {
    /// Create a source over the registry.
    pub fn new(registry: Arc<RateRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RateSource for LocalRateSource {
    fn kind(&self) -> RateSourceKind {
        RateSourceKind::Local
    }

    fn name(&self) -> &str {
        self.registry.store_name()
    }

    async fn rate_for(&self, code: &str) -> Result<Decimal> {
        self.registry
            .get_rate(code)
            .await?
            .map(|record| record.rate)
            .ok_or_else(|| RatebookError::NotFound(code.to_uppercase()))
    }
}

/// Queries the quote service for every lookup.
///
/// Never reads or writes the registry, and keeps nothing between calls.
pub struct RemoteRateSource {
    client: Arc<dyn QuoteClient>,
    base: CurrencyCode,
}

impl RemoteRateSource {
    /// Create a source quoting against `base`.
    pub fn new(client: Arc<dyn QuoteClient>, base: CurrencyCode) -> Self {
        Self { client, base }
    }

    /// Get the base currency requested from the service.
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }
}

#[async_trait]
impl RateSource for RemoteRateSource {
    fn kind(&self) -> RateSourceKind {
        RateSourceKind::Remote
    }

    fn name(&self) -> &str {
        self.client.name()
    }

    async fn rate_for(&self, code: &str) -> Result<Decimal> {
        let code = CurrencyCode::parse(code)?;

        let body = self
            .client
            .fetch_latest(&self.base, std::slice::from_ref(&code))
            .await?;
        let rate = LatestRates::parse(&body)?.rate_for(&code)?;

        debug!(
            client = self.client.name(),
            base = %self.base,
            code = %code,
            rate = %rate,
            "Quoted rate"
        );

        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::MockQuoteClient;
    use ratebook_registry::MemoryRateStore;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_local_source() {
        let registry = Arc::new(RateRegistry::new(Arc::new(MemoryRateStore::new())));
        registry.add_rate("EUR", dec!(0.89)).await.unwrap();
        let source = LocalRateSource::new(registry);

        assert_eq!(source.rate_for("eur").await.unwrap(), dec!(0.89));
        assert!(matches!(
            source.rate_for("GBP").await,
            Err(RatebookError::NotFound(ref c)) if c == "GBP"
        ));
        assert_eq!(source.kind(), RateSourceKind::Local);
    }

    #[tokio::test]
    async fn test_remote_source() {
        let client = Arc::new(MockQuoteClient::new("test"));
        client.set_rate("EUR", dec!(0.91));
        let source = RemoteRateSource::new(client.clone(), CurrencyCode::usd());

        assert_eq!(source.rate_for("eur").await.unwrap(), dec!(0.91));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_source_missing_code() {
        let client = Arc::new(MockQuoteClient::new("test"));
        let source = RemoteRateSource::new(client, CurrencyCode::usd());

        assert!(matches!(
            source.rate_for("PHP").await,
            Err(RatebookError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_source_rejects_bad_code_without_request() {
        let client = Arc::new(MockQuoteClient::new("test"));
        let source = RemoteRateSource::new(client.clone(), CurrencyCode::usd());

        assert!(matches!(
            source.rate_for("EURO").await,
            Err(RatebookError::Validation { .. })
        ));
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn test_source_kind_from_flag() {
        assert_eq!(RateSourceKind::from_remote_flag(true), RateSourceKind::Remote);
        assert_eq!(RateSourceKind::from_remote_flag(false), RateSourceKind::Local);
        assert_eq!(RateSourceKind::Remote.to_string(), "remote");
    }
}
