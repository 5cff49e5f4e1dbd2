//! Exchange service configuration.

use ratebook_common::{CurrencyCode, RatebookError, Result};
use ratebook_registry::StoreConfig;

/// Configuration of the remote rate quote service.
#[derive(Debug, Clone)]
pub struct QuoteServiceConfig {
    /// Service root; requests go to `{base_url}/latest`.
    pub base_url: String,
    /// Base currency every quote is requested against.
    pub base_currency: String,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchangeratesapi.io".to_string(),
            base_currency: "USD".to_string(),
            user_agent: concat!("ratebook/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl QuoteServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RATEBOOK_QUOTE_URL") {
            config.base_url = url;
        }

        if let Ok(base) = std::env::var("RATEBOOK_BASE_CURRENCY") {
            config.base_currency = base;
        }

        config
    }

    /// Get the parsed base currency.
    pub fn base_currency(&self) -> Result<CurrencyCode> {
        CurrencyCode::parse(&self.base_currency).map_err(|e| {
            RatebookError::Configuration(format!("Invalid base currency: {}", e))
        })
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(RatebookError::Configuration(format!(
                "Quote service URL must be http(s): '{}'",
                self.base_url
            )));
        }

        self.base_currency()?;
        Ok(())
    }
}

/// Configuration of the whole exchange service.
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfig {
    /// Rate store configuration.
    pub store: StoreConfig,
    /// Quote service configuration.
    pub quote: QuoteServiceConfig,
}

impl ExchangeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            quote: QuoteServiceConfig::from_env(),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.quote.validate()
    }
}
