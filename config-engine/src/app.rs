use accounting_service::LedgerPolicy;
use database_layer::DatabaseConfig;
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are answered with 408
    pub request_timeout_secs: u64,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Everything a LexLedger process needs, grouped by concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub ledger: LedgerPolicy,
    pub logging: LoggerConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Check cross-field constraints the individual sections cannot see
    pub fn validate(&self) -> Result<()> {
        let db = &self.database;
        if !(db.url.starts_with("postgres://") || db.url.starts_with("postgresql://")) {
            return Err(ConfigError::ValidationError(format!(
                "database.url must be a postgres:// URL, got '{}'",
                db.masked_url()
            )));
        }
        if db.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::ValidationError(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }

        self.ledger
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("ledger: {}", e)))?;

        if self.logging.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.log_level must not be empty".to_string(),
            ));
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("server.host must not be empty".to_string()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
        assert_eq!(AppConfig::default().server.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut config = AppConfig::default();
        config.database.url = "mysql://root:secret@db/ledger".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("postgres://"));
        assert!(!err.contains("secret"));
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut config = AppConfig::default();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn ledger_policy_errors_are_surfaced() {
        let mut config = AppConfig::default();
        config.ledger.conflict_retries = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ledger"));
    }

    #[test]
    fn partial_yaml_keeps_section_defaults() {
        let yaml = "server:\n  port: 9000\nledger:\n  default_currency: EGP\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ledger.default_currency, "EGP");
        assert_eq!(config.ledger.conflict_retries, 3);
        assert!(config.logging.redaction_enabled);
    }
}
