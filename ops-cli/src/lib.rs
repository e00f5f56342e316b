//! Operations CLI for LexLedger
//!
//! Replaces ad hoc maintenance scripts with commands that run through the
//! accounting service, so every bulk change is a single transaction:
//!
//! ```bash
//! lexledger-ops migrate
//! lexledger-ops wipe-financials --company <uuid> --confirm
//! lexledger-ops reset-coa --company <uuid> --confirm
//! lexledger-ops delete-project --project <uuid> --confirm
//! lexledger-ops find-orphans
//! lexledger-ops purge-orphans --confirm
//! lexledger-ops set-rate EGP USD 0.0205
//! lexledger-ops get-rate EGP USD
//! lexledger-ops reconcile --company <uuid> --currency USD
//! ```
//!
//! Failures exit with the code of their error category: 2 validation,
//! 3 not found, 4 conflict, 5 storage, 1 anything else.

pub mod cli;
pub mod commands;

pub use cli::*;
pub use commands::*;

use accounting_service::store::PostgresLedgerStore;
use accounting_service::{AccountingError, AccountingService};
use anyhow::Context;
use config_engine::{AppConfig, ConfigError};
use database_layer::{run_migrations, DatabaseError, DatabasePool};
use error_common::ErrorClassification;
use logger_redacted::PiiRedactor;
use std::sync::Arc;

/// Run one command against the pool, then close the pool whatever the outcome
pub async fn run_command(cli: &Cli, config: &AppConfig, pool: DatabasePool) -> anyhow::Result<String> {
    let result = dispatch(cli, config, &pool).await;
    pool.close().await;
    result
}

async fn dispatch(cli: &Cli, config: &AppConfig, pool: &DatabasePool) -> anyhow::Result<String> {
    if cli.command == Command::Migrate {
        run_migrations(pool).await.context("running migrations")?;
        return Ok("Database schema is up to date".to_string());
    }

    let store = Arc::new(PostgresLedgerStore::new(pool.clone()));
    let service = AccountingService::new(
        store,
        config.ledger.clone(),
        PiiRedactor::from_enabled(config.logging.redaction_enabled),
    )?;
    let output = execute(&service, &cli.command)
        .await
        .with_context(|| format!("{} failed", cli.command.name()))?;
    Ok(output.render(cli.json))
}

/// Exit code for an error returned from `main`
pub fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<OpsError>() {
        return e.category().exit_code();
    }
    if let Some(e) = error.downcast_ref::<AccountingError>() {
        return e.category().exit_code();
    }
    if let Some(e) = error.downcast_ref::<DatabaseError>() {
        return e.category().exit_code();
    }
    if let Some(e) = error.downcast_ref::<ConfigError>() {
        return e.category().exit_code();
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    #[test]
    fn exit_code_sees_through_context() {
        let err: anyhow::Result<()> = Err(OpsError::ConfirmationRequired("purge-orphans"))
            .context("running purge-orphans");
        assert_eq!(exit_code(&err.unwrap_err()), 2);

        let missing = anyhow::Error::new(AccountingError::not_found("project", "p-1"));
        assert_eq!(exit_code(&missing), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[tokio::test]
    async fn pool_is_closed_when_the_command_fails() {
        // Nothing listens on port 1, so the first query fails
        let pg = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://lexledger@127.0.0.1:1/lexledger")
            .unwrap();
        let pool = DatabasePool::from_pool(pg);
        let cli = Cli::try_parse_from(["lexledger-ops", "find-orphans"]).unwrap();

        let result = run_command(&cli, &AppConfig::default(), pool.clone()).await;

        assert!(result.is_err());
        assert!(pool.pool().is_closed());
    }
}
