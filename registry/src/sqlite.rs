//! SQLite-backed rate store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use ratebook_common::{CurrencyCode, CurrencyRate, RateId, RatebookError, Result};

use crate::config::StoreConfig;
use crate::store::RateStore;

/// AUTOINCREMENT keeps deleted ids from being handed out again.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS currency_rates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE CHECK (length(code) = 3),
    rate TEXT NOT NULL
)";

type RateRow = (i64, String, String);

/// Rate store persisted in SQLite through a sqlx connection pool.
///
/// Rates are stored as decimal text so they read back exactly as written.
pub struct SqliteRateStore {
    pool: SqlitePool,
}

impl SqliteRateStore {
    /// Open (creating if missing) the database named by `config` and ensure the schema exists.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(storage_error)?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database, so an
        // in-memory store is pinned to one connection that is never recycled.
        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        let store = Self::from_pool(pool).await?;
        info!(database_url = %config.database_url, "Rate store ready");
        Ok(store)
    }

    /// Wrap an existing pool and ensure the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(storage_error)?;
        Ok(Self { pool })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn to_record((id, code, rate): RateRow) -> Result<CurrencyRate> {
        let code = CurrencyCode::parse(&code)
            .map_err(|e| RatebookError::Storage(format!("corrupt code '{}': {}", code, e)))?;
        let rate = Decimal::from_str(&rate)
            .map_err(|e| RatebookError::Storage(format!("corrupt rate '{}': {}", rate, e)))?;
        Ok(CurrencyRate::new(RateId::new(id), code, rate))
    }
}

fn storage_error(err: sqlx::Error) -> RatebookError {
    RatebookError::Storage(err.to_string())
}

#[async_trait]
impl RateStore for SqliteRateStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find(&self, code: &CurrencyCode) -> Result<Option<CurrencyRate>> {
        let row: Option<RateRow> =
            sqlx::query_as("SELECT id, code, rate FROM currency_rates WHERE code = ?")
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        row.map(Self::to_record).transpose()
    }

    async fn find_by_id(&self, id: RateId) -> Result<Option<CurrencyRate>> {
        let row: Option<RateRow> =
            sqlx::query_as("SELECT id, code, rate FROM currency_rates WHERE id = ?")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        row.map(Self::to_record).transpose()
    }

    async fn insert(&self, code: CurrencyCode, rate: Decimal) -> Result<CurrencyRate> {
        let result = sqlx::query("INSERT INTO currency_rates (code, rate) VALUES (?, ?)")
            .bind(code.as_str())
            .bind(rate.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let id = RateId::new(done.last_insert_rowid());
                debug!(id = %id, code = %code, "Inserted rate");
                Ok(CurrencyRate::new(id, code, rate))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RatebookError::Conflict(code.to_string()))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn update(&self, code: &CurrencyCode, rate: Decimal) -> Result<CurrencyRate> {
        let row: Option<(i64,)> =
            sqlx::query_as("UPDATE currency_rates SET rate = ? WHERE code = ? RETURNING id")
                .bind(rate.to_string())
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        match row {
            Some((id,)) => Ok(CurrencyRate::new(RateId::new(id), code.clone(), rate)),
            None => Err(RatebookError::NotFound(code.to_string())),
        }
    }

    async fn delete(&self, code: &CurrencyCode) -> Result<()> {
        let done = sqlx::query("DELETE FROM currency_rates WHERE code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if done.rows_affected() == 0 {
            return Err(RatebookError::NotFound(code.to_string()));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CurrencyRate>> {
        let rows: Vec<RateRow> = sqlx::query_as("SELECT id, code, rate FROM currency_rates ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(Self::to_record).collect()
    }
}
