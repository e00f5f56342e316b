use logger_redacted::PiiRedactor;
use std::sync::Arc;

use crate::error::AccountingResult;
use crate::ledger::GeneralLedger;
use crate::maintenance::Maintenance;
use crate::policy::LedgerPolicy;
use crate::practice::PracticeRecords;
use crate::registry::AccountRegistry;
use crate::reporting::AccountingReports;
use crate::settings::SettingsStore;
use crate::store::{InMemoryLedgerStore, LedgerStore};
use crate::trust::TrustSubledger;

/// Accounting service: one entry point over a shared store and policy
pub struct AccountingService {
    store: Arc<dyn LedgerStore>,
    policy: Arc<LedgerPolicy>,
    registry: AccountRegistry,
    ledger: GeneralLedger,
    trust: TrustSubledger,
    maintenance: Maintenance,
    settings: SettingsStore,
    practice: PracticeRecords,
    reports: AccountingReports,
}

impl AccountingService {
    /// Create a new accounting service; the policy is validated first
    pub fn new(
        store: Arc<dyn LedgerStore>,
        policy: LedgerPolicy,
        redactor: PiiRedactor,
    ) -> AccountingResult<Self> {
        policy.validate()?;
        Ok(Self::assemble(store, Arc::new(policy), redactor))
    }

    /// Service over a fresh in-memory store with default policy
    pub fn in_memory() -> Self {
        Self::assemble(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(LedgerPolicy::default()),
            PiiRedactor::default(),
        )
    }

    fn assemble(store: Arc<dyn LedgerStore>, policy: Arc<LedgerPolicy>, redactor: PiiRedactor) -> Self {
        Self {
            registry: AccountRegistry::new(store.clone(), policy.clone()),
            ledger: GeneralLedger::new(store.clone(), policy.clone()),
            trust: TrustSubledger::new(store.clone(), policy.clone(), redactor),
            maintenance: Maintenance::new(store.clone()),
            settings: SettingsStore::new(store.clone()),
            practice: PracticeRecords::new(store.clone(), policy.clone()),
            reports: AccountingReports::new(store.clone()),
            store,
            policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    pub fn accounts(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &GeneralLedger {
        &self.ledger
    }

    pub fn trust(&self) -> &TrustSubledger {
        &self.trust
    }

    pub fn maintenance(&self) -> &Maintenance {
        &self.maintenance
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn practice(&self) -> &PracticeRecords {
        &self.practice
    }

    pub fn reports(&self) -> &AccountingReports {
        &self.reports
    }
}
