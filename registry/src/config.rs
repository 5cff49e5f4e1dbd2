//! Rate store configuration.

use ratebook_common::{RatebookError, Result};

/// Configuration of the durable rate store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://ratebook.db".to_string(),
            max_connections: 4,
        }
    }
}

impl StoreConfig {
    /// Configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RATEBOOK_DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(max) = std::env::var("RATEBOOK_DB_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                config.max_connections = max;
            }
        }

        config
    }

    /// Whether the URL points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(RatebookError::Configuration(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if !self.database_url.starts_with("sqlite:") {
            return Err(RatebookError::Configuration(format!(
                "Unsupported database URL: {}",
                self.database_url
            )));
        }

        if self.max_connections == 0 {
            return Err(RatebookError::Configuration(
                "Max connections cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_config() {
        let config = StoreConfig::in_memory();
        assert!(config.validate().is_ok());
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = StoreConfig::default();
        config.max_connections = 0;
        assert!(config.validate().is_err());

        let config = StoreConfig {
            database_url: "postgres://localhost/rates".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RatebookError::Configuration(_))
        ));
    }
}
