//! Ratebook CLI
//!
//! Manage registered currency rates and convert amounts between currencies.

use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratebook_fx::{cancel_pair, CancelHandle, ExchangeConfig, ExchangeService};

mod commands;

use commands::{execute, Command};

/// Ratebook CLI
#[derive(Parser, Debug)]
#[command(name = "ratebook")]
#[command(about = "Currency rate registry and converter")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// SQLite database URL (overrides RATEBOOK_DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Quote service URL (overrides RATEBOOK_QUOTE_URL)
    #[arg(long, global = true)]
    quote_url: Option<String>,

    /// Cancel the command after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let json = std::env::var("RATEBOOK_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Logs go to stderr so command output stays clean.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Cancel on Ctrl+C or once `timeout` elapses.
fn spawn_cancel_watcher(handle: CancelHandle, timeout: Option<Duration>) {
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    return;
                }
                info!("Interrupt received");
                handle.cancel("interrupted");
            }
            _ = deadline => {
                handle.cancel(format!("timed out after {:?}", timeout.unwrap_or_default()));
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();

    let mut config = ExchangeConfig::from_env();
    if let Some(url) = args.database_url {
        config.store.database_url = url;
    }
    if let Some(url) = args.quote_url {
        config.quote.base_url = url;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let service = ExchangeService::connect(&config).await?;

    let (handle, signal) = cancel_pair();
    let timeout = args.timeout_ms.map(Duration::from_millis);
    if args.command.is_remote() {
        info!(timeout = ?timeout, "Remote lookup");
    }
    spawn_cancel_watcher(handle, timeout);

    match execute(&service, args.command, &signal, args.json).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Command failed");
            Err(e.into())
        }
    }
}
