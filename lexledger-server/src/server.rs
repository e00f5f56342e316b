use accounting_service::AccountingService;
use database_layer::DatabasePool;
use std::sync::Arc;
use std::time::Instant;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct LedgerServer {
    pub service: Arc<AccountingService>,
    /// Present when backed by PostgreSQL; used by the health check
    pub database: Option<DatabasePool>,
    pub started_at: Instant,
}

impl LedgerServer {
    pub fn new(service: AccountingService) -> Self {
        Self {
            service: Arc::new(service),
            database: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }

    /// Server over an empty in-memory store, for tests and demos
    pub fn in_memory() -> Self {
        Self::new(AccountingService::in_memory())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
