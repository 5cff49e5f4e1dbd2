//! Resolution of a currency code to its rate.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use ratebook_common::Result;

use crate::cancel::CancelSignal;
use crate::provider::{RateSource, RateSourceKind};

/// Picks the rate source for each lookup.
///
/// The local and remote sources are independent and may disagree; the
/// caller chooses which one to trust on every call. Rates from either
/// source are taken as quoted against the same base, unchecked.
pub struct RateResolver {
    local: Arc<dyn RateSource>,
    remote: Arc<dyn RateSource>,
}

impl RateResolver {
    /// Create a resolver over the two sources.
    pub fn new(local: Arc<dyn RateSource>, remote: Arc<dyn RateSource>) -> Self {
        Self { local, remote }
    }

    /// Get the source of the given kind.
    pub fn source(&self, kind: RateSourceKind) -> &Arc<dyn RateSource> {
        match kind {
            RateSourceKind::Local => &self.local,
            RateSourceKind::Remote => &self.remote,
        }
    }

    /// Resolve the rate of `code`, from the quote service when `use_remote`
    /// is set and from the registry otherwise.
    pub async fn resolve(&self, code: &str, use_remote: bool) -> Result<Decimal> {
        self.resolve_from(code, RateSourceKind::from_remote_flag(use_remote))
            .await
    }

    /// Resolve the rate of `code` from the given source.
    #[instrument(skip(self))]
    pub async fn resolve_from(&self, code: &str, kind: RateSourceKind) -> Result<Decimal> {
        let source = self.source(kind);

        match source.rate_for(code).await {
            Ok(rate) => {
                debug!(source = source.name(), rate = %rate, "Rate resolved");
                Ok(rate)
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Rate resolution failed");
                Err(e)
            }
        }
    }

    /// Resolve unless `cancel` fires first.
    pub async fn resolve_with_cancel(
        &self,
        code: &str,
        use_remote: bool,
        cancel: &CancelSignal,
    ) -> Result<Decimal> {
        cancel.run(self.resolve(code, use_remote)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancel_pair;
    use crate::provider::{LocalRateSource, RemoteRateSource};
    use crate::quote::MockQuoteClient;
    use ratebook_common::{CurrencyCode, RatebookError};
    use ratebook_registry::{MemoryRateStore, RateRegistry};
    use rust_decimal_macros::dec;

    async fn setup() -> (RateResolver, Arc<RateRegistry>, Arc<MockQuoteClient>) {
        let registry = Arc::new(RateRegistry::new(Arc::new(MemoryRateStore::new())));
        registry.add_rate("USD", dec!(1)).await.unwrap();
        registry.add_rate("EUR", dec!(0.89)).await.unwrap();

        let client = Arc::new(MockQuoteClient::new("test"));
        client.set_rate("EUR", dec!(0.92));

        let resolver = RateResolver::new(
            Arc::new(LocalRateSource::new(registry.clone())),
            Arc::new(RemoteRateSource::new(client.clone(), CurrencyCode::usd())),
        );

        (resolver, registry, client)
    }

    #[tokio::test]
    async fn test_sources_are_independent() {
        let (resolver, registry, client) = setup().await;

        assert_eq!(resolver.resolve("EUR", false).await.unwrap(), dec!(0.89));
        assert_eq!(client.request_count(), 0);

        assert_eq!(resolver.resolve("EUR", true).await.unwrap(), dec!(0.92));
        assert_eq!(client.request_count(), 1);

        // The remote quote is not written back.
        assert_eq!(registry.get_rate("EUR").await.unwrap().unwrap().rate, dec!(0.89));
    }

    #[tokio::test]
    async fn test_local_not_found() {
        let (resolver, _, _) = setup().await;

        assert!(matches!(
            resolver.resolve("PHP", false).await,
            Err(RatebookError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_does_not_consult_registry() {
        let (resolver, _, _) = setup().await;

        // USD is registered locally but the quote service has no rate for it.
        assert!(matches!(
            resolver.resolve("USD", true).await,
            Err(RatebookError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces() {
        let (resolver, _, client) = setup().await;
        client.fail_with("connection refused");

        assert_eq!(
            resolver.resolve("EUR", true).await,
            Err(RatebookError::Upstream("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_resolve_cancelled() {
        let (resolver, _, client) = setup().await;
        let (handle, signal) = cancel_pair();
        handle.cancel("shutdown");

        let result = resolver.resolve_with_cancel("EUR", true, &signal).await;

        assert!(matches!(result, Err(RatebookError::Cancelled(_))));
        assert_eq!(client.request_count(), 0);
    }
}
