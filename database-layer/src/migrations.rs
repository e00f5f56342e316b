use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use sqlx::migrate::Migrator;
use tracing::info;

/// Ledger schema, embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations
pub async fn run_migrations(pool: &DatabasePool) -> DatabaseResult<()> {
    MIGRATOR.run(pool.pool()).await?;
    info!(migrations = MIGRATOR.iter().count(), "Database schema is up to date");
    Ok(())
}
