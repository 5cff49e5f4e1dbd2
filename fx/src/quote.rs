//! Client for the remote rate quote service and its payload.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use ratebook_common::{CurrencyCode, RatebookError, Result};

use crate::config::QuoteServiceConfig;

/// Response of the `latest` endpoint: rates of the requested symbols
/// against the requested base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRates {
    /// Base currency the service quoted against.
    #[serde(default)]
    pub base: Option<String>,
    /// Quoted rate per currency code.
    pub rates: HashMap<String, Decimal>,
}

impl LatestRates {
    /// Decode a response body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| RatebookError::Upstream(format!("malformed quote payload: {}", e)))
    }

    /// Get the quoted rate for `code`.
    pub fn rate_for(&self, code: &CurrencyCode) -> Result<Decimal> {
        let rate = self.rates.get(code.as_str()).copied().ok_or_else(|| {
            RatebookError::Upstream(format!("quote payload has no rate for {}", code))
        })?;

        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(RatebookError::Upstream(format!(
                "quote service returned negative rate {} for {}",
                rate, code
            )));
        }

        Ok(rate)
    }
}

/// Transport to the rate quote service.
///
/// Returns the raw body of one `latest` request; decoding is left to the
/// caller so every transport shares the same payload rules.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Get the client name.
    fn name(&self) -> &str;

    /// Fetch the latest rates of `symbols` against `base`.
    async fn fetch_latest(&self, base: &CurrencyCode, symbols: &[CurrencyCode]) -> Result<String>;
}

/// HTTP quote client.
///
/// No retry and no timeout beyond reqwest's defaults; callers bound latency
/// with a [`crate::CancelSignal`].
pub struct HttpQuoteClient {
    http: Client,
    base_url: String,
}

impl HttpQuoteClient {
    /// Create a client for the configured service.
    pub fn new(config: &QuoteServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RatebookError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the request URL. Codes are ASCII letters, so nothing needs escaping.
    pub fn latest_url(&self, base: &CurrencyCode, symbols: &[CurrencyCode]) -> String {
        let symbols: Vec<&str> = symbols.iter().map(|c| c.as_str()).collect();
        format!(
            "{}/latest?base={}&symbols={}",
            self.base_url,
            base,
            symbols.join(",")
        )
    }
}

#[async_trait]
impl QuoteClient for HttpQuoteClient {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_latest(&self, base: &CurrencyCode, symbols: &[CurrencyCode]) -> Result<String> {
        let url = self.latest_url(base, symbols);
        debug!(url = %url, "Requesting quote");

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RatebookError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatebookError::Upstream(format!(
                "quote service returned {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| RatebookError::Upstream(e.to_string()))
    }
}

/// Mock quote client for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockQuoteClient {
    name: String,
    rates: dashmap::DashMap<String, Decimal>,
    failure: parking_lot::Mutex<Option<String>>,
    requests: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockQuoteClient {
    /// Create a new mock client.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            failure: parking_lot::Mutex::new(None),
            requests: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the quoted rate for a code.
    pub fn set_rate(&self, code: &str, rate: Decimal) {
        self.rates.insert(code.to_string(), rate);
    }

    /// Make every following request fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl QuoteClient for MockQuoteClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_latest(&self, base: &CurrencyCode, symbols: &[CurrencyCode]) -> Result<String> {
        self.requests
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let failure = self.failure.lock().clone();
        if let Some(message) = failure {
            return Err(RatebookError::Upstream(message));
        }

        // Like the real service, unknown symbols are simply left out.
        let rates: HashMap<String, Decimal> = symbols
            .iter()
            .filter_map(|code| {
                self.rates
                    .get(code.as_str())
                    .map(|rate| (code.to_string(), *rate))
            })
            .collect();

        let payload = LatestRates {
            base: Some(base.to_string()),
            rates,
        };
        serde_json::to_string(&payload).map_err(|e| RatebookError::Upstream(e.to_string()))
    }
}
