//! Ratebook FX Engine
//!
//! Exchange-rate resolution and currency conversion over a local rate
//! registry and a remote rate quote service.
//!
//! # Features
//!
//! - One `RateSource` capability with local and remote variants
//! - Conversion by rebasing through the shared base currency
//! - Caller-driven cancellation of lookups and conversions
//!
//! # Example
//!
//! ```rust,ignore
//! use ratebook_fx::{ExchangeConfig, ExchangeService};
//! use rust_decimal_macros::dec;
//!
//! let service = ExchangeService::connect(&ExchangeConfig::from_env()).await?;
//! service.seed_defaults().await?;
//!
//! // 7000 ARS in USD, from the local registry
//! let usd = service.convert("ARS", "USD", dec!(7000), false).await?;
//! ```

pub mod cancel;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod provider;
pub mod quote;
pub mod resolver;
pub mod service;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use config::{ExchangeConfig, QuoteServiceConfig};
pub use conversion::{Conversion, ConversionRequest};
pub use engine::ConversionEngine;
pub use provider::{LocalRateSource, RateSource, RateSourceKind, RemoteRateSource};
pub use quote::{HttpQuoteClient, LatestRates, QuoteClient};
pub use resolver::RateResolver;
pub use service::ExchangeService;

#[cfg(any(test, feature = "test-utils"))]
pub use quote::MockQuoteClient;
