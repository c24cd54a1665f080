//! Service configuration.
//!
//! All settings come from environment variables (a `.env` file is honored at
//! startup); everything except the store connection string has a default.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// Database holding the tasks collection.
    pub db_name: String,
    /// Name of the tasks collection.
    pub collection_name: String,
}

impl Config {
    /// Build the configuration from environment variables:
    ///
    /// - `HOST` (default `0.0.0.0`)
    /// - `PORT` (default `3000`)
    /// - `MONGODB_URI` (required)
    /// - `TASKS_DB` (default `taskboard`)
    /// - `TASKS_COLLECTION` (default `tasks`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT",
                    message: e.to_string(),
                }
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            mongodb_uri: std::env::var("MONGODB_URI")
                .map_err(|_| ConfigError::MissingVar("MONGODB_URI"))?,
            db_name: std::env::var("TASKS_DB").unwrap_or_else(|_| "taskboard".to_string()),
            collection_name: std::env::var("TASKS_COLLECTION")
                .unwrap_or_else(|_| "tasks".to_string()),
        })
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            db_name: "taskboard".to_string(),
            collection_name: "tasks".to_string(),
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    // Env manipulation stays inside one test so parallel tests never race.
    #[test]
    fn from_env_requires_uri_and_fills_defaults() {
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
        std::env::remove_var("TASKS_DB");
        std::env::remove_var("TASKS_COLLECTION");
        std::env::remove_var("MONGODB_URI");

        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar("MONGODB_URI"))
        ));

        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        let config = Config::from_env().expect("uri is set");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_name, "taskboard");
        assert_eq!(config.collection_name, "tasks");

        std::env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { key: "PORT", .. })
        ));

        std::env::remove_var("PORT");
        std::env::remove_var("MONGODB_URI");
    }
}
