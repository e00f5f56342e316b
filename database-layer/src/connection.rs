// Database connection management
use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DatabaseResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Database connection pool wrapper
#[derive(Clone, Debug)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let mut options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        if config.statement_timeout_ms > 0 {
            let timeout = config.statement_timeout_ms.to_string();
            options = options.options([("statement_timeout", timeout.as_str())]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        info!(
            url = %config.masked_url(),
            max_connections = config.max_connections,
            statement_timeout_ms = config.statement_timeout_ms,
            "Database connection pool created"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying PgPool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the pool is healthy
    pub async fn is_healthy(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
