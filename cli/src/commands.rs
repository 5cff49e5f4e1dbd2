//! Subcommands and their execution against the exchange service.

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;

use ratebook_common::{RatebookError, Result};
use ratebook_fx::{CancelSignal, ConversionRequest, ExchangeService};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register the default rates when the registry is empty
    Seed,

    /// List every registered rate
    List,

    /// Show the registered rate of one currency
    Get {
        /// Three-letter currency code
        code: String,
    },

    /// Register a new currency rate
    Add {
        code: String,
        /// Units of the currency per one unit of the base currency
        rate: Decimal,
    },

    /// Replace the rate of a registered currency
    Update { code: String, rate: Decimal },

    /// Remove a registered currency
    Remove { code: String },

    /// Resolve the current rate of a currency
    Resolve {
        code: String,

        /// Ask the remote quote service instead of the local registry
        #[arg(long)]
        remote: bool,
    },

    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        amount: Decimal,

        /// Ask the remote quote service instead of the local registry
        #[arg(long)]
        remote: bool,
    },
}

impl Command {
    /// Whether the command may wait on the quote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Command::Resolve { remote: true, .. } | Command::Convert { remote: true, .. }
        )
    }
}

/// Run one command and render its output.
pub async fn execute(
    service: &ExchangeService,
    command: Command,
    cancel: &CancelSignal,
    json: bool,
) -> Result<String> {
    match command {
        Command::Seed => {
            let seeded = service.seed_defaults().await?;
            Ok(format!("Seeded {} rates", seeded))
        }

        Command::List => {
            let rates = service.list_rates().await?;
            if json {
                return to_json(&rates);
            }
            Ok(rates
                .iter()
                .map(|rate| rate.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Command::Get { code } => match service.get_rate(&code).await? {
            Some(rate) if json => to_json(&rate),
            Some(rate) => Ok(rate.to_string()),
            None => Err(RatebookError::NotFound(code.to_uppercase())),
        },

        Command::Add { code, rate } => {
            let id = service.add_rate(&code, rate).await?;
            info!(id = %id, code = %code, "Rate added");
            Ok(format!("Added {} with id {}", code.to_uppercase(), id))
        }

        Command::Update { code, rate } => {
            let updated = service.update_rate(&code, rate).await?;
            Ok(updated.to_string())
        }

        Command::Remove { code } => {
            service.remove_rate(&code).await?;
            Ok(format!("Removed {}", code.to_uppercase()))
        }

        Command::Resolve { code, remote } => {
            let rate = service.resolve_with_cancel(&code, remote, cancel).await?;
            Ok(rate.normalize().to_string())
        }

        Command::Convert {
            from,
            to,
            amount,
            remote,
        } => {
            let request = ConversionRequest::new(from, to, amount).with_remote(remote);
            let conversion = service.convert_with_cancel(request, cancel).await?;
            if json {
                return to_json(&conversion);
            }
            Ok(format!(
                "{} {} = {} {}",
                conversion.amount, conversion.from, conversion.converted, conversion.to
            ))
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RatebookError::Storage(format!("failed to render output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ratebook_common::CurrencyCode;
    use ratebook_fx::MockQuoteClient;
    use ratebook_registry::MemoryRateStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[derive(Parser)]
    struct TestArgs {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        TestArgs::parse_from(std::iter::once("ratebook").chain(args.iter().copied())).command
    }

    async fn seeded_service(quotes: Arc<MockQuoteClient>) -> ExchangeService {
        let service = ExchangeService::new(
            Arc::new(MemoryRateStore::new()),
            quotes,
            CurrencyCode::usd(),
        );
        service.seed_defaults().await.unwrap();
        service
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            parse(&["convert", "ARS", "USD", "7000"]),
            Command::Convert { remote: false, ref amount, .. } if *amount == dec!(7000)
        ));
        assert!(parse(&["resolve", "EUR", "--remote"]).is_remote());
        assert!(!parse(&["add", "GBP", "0.78"]).is_remote());
    }

    #[tokio::test]
    async fn test_execute_local_commands() {
        let service = seeded_service(Arc::new(MockQuoteClient::new("test"))).await;
        let cancel = CancelSignal::never();

        let output = execute(&service, parse(&["convert", "ARS", "USD", "7000"]), &cancel, false)
            .await
            .unwrap();
        assert_eq!(output, "7000 ARS = 100.72 USD");

        let output = execute(&service, parse(&["get", "php"]), &cancel, false)
            .await
            .unwrap();
        assert_eq!(output, "CurrencyId: 4 - CurrencyCode: PHP - ExchangeRate: 43.1232");

        let listing = execute(&service, parse(&["list"]), &cancel, false)
            .await
            .unwrap();
        assert_eq!(listing.lines().count(), 5);
    }

    #[tokio::test]
    async fn test_execute_errors() {
        let service = seeded_service(Arc::new(MockQuoteClient::new("test"))).await;
        let cancel = CancelSignal::never();

        assert_eq!(
            execute(&service, parse(&["get", "GBP"]), &cancel, false).await,
            Err(RatebookError::NotFound("GBP".to_string()))
        );
        assert!(matches!(
            execute(&service, parse(&["add", "EUR", "0.9"]), &cancel, false).await,
            Err(RatebookError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_remote_resolve() {
        let quotes = Arc::new(MockQuoteClient::new("test"));
        quotes.set_rate("EUR", dec!(0.9134));
        let service = seeded_service(quotes.clone()).await;

        let output = execute(
            &service,
            parse(&["resolve", "eur", "--remote"]),
            &CancelSignal::never(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(output, "0.9134");
        assert_eq!(quotes.request_count(), 1);
    }
}
