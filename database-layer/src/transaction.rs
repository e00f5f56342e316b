// Transaction management
use crate::connection::DatabasePool;
use crate::error::DatabaseResult;
use sqlx::{Postgres, Transaction};
use tracing::{debug, error};

/// Opens and finishes database transactions. Dropping an open transaction rolls it back.
#[derive(Clone, Debug)]
pub struct TransactionManager {
    pool: DatabasePool,
}

impl TransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Begin a new transaction
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        debug!("Beginning transaction");
        Ok(self.pool.pool().begin().await?)
    }

    /// Commit, logging failures before handing them back
    pub async fn commit(&self, tx: Transaction<'static, Postgres>) -> DatabaseResult<()> {
        tx.commit().await.map_err(|e| {
            error!("Transaction commit failed: {}", e);
            e.into()
        })
    }
}
