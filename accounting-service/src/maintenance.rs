use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::store::{
    BatchOutcome, LedgerStore, LedgerTable, Mutation, Scope, StepOutcome, TrustScope, WriteBatch,
};
use crate::validation::constraint_error;

/// Rows removed per table, in deletion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub steps: Vec<StepOutcome>,
}

impl DeletionReport {
    pub fn rows_for(&self, table: LedgerTable) -> u64 {
        self.steps
            .iter()
            .filter(|s| s.table == table)
            .map(|s| s.rows)
            .sum()
    }

    pub fn total_rows(&self) -> u64 {
        self.steps.iter().map(|s| s.rows).sum()
    }
}

impl From<BatchOutcome> for DeletionReport {
    fn from(outcome: BatchOutcome) -> Self {
        Self { steps: outcome.steps }
    }
}

/// Children before parents; every step sees the rows its scope joins through
pub fn wipe_plan(company_id: Uuid) -> WriteBatch {
    let scope = Scope::Company(company_id);
    WriteBatch::new()
        .with(Mutation::DeleteTransactionLines(scope))
        .with(Mutation::DeleteTransactions(scope))
        .with(Mutation::DeleteTrustTransactions(TrustScope::Company(company_id)))
        .with(Mutation::DeleteTrustAccounts(TrustScope::Company(company_id)))
        .with(Mutation::DeleteInvoices(scope))
        .with(Mutation::DeleteTimeEntries(scope))
        .with(Mutation::DeleteAssignments(scope))
        .with(Mutation::DeleteProjects(scope))
        .with(Mutation::DeleteClients { company_id })
        .with(Mutation::DeleteAccounts { company_id })
}

/// Project removal: ledger rows go, trust accounts stay behind as orphans
pub fn project_deletion_plan(project_id: Uuid) -> WriteBatch {
    let scope = Scope::Project(project_id);
    WriteBatch::new()
        .with(Mutation::DeleteTransactionLines(scope))
        .with(Mutation::DeleteTransactions(scope))
        .with(Mutation::DetachTrustAccounts { project_id })
        .with(Mutation::DeleteInvoices(scope))
        .with(Mutation::DeleteTimeEntries(scope))
        .with(Mutation::DeleteAssignments(scope))
        .with(Mutation::DeleteProjects(scope))
}

/// Bulk, destructive operations
pub struct Maintenance {
    store: Arc<dyn LedgerStore>,
}

impl Maintenance {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Remove every financial and practice record of the company in one
    /// transaction. Either all of it goes or none of it does.
    pub async fn wipe_company_financials(&self, company_id: Uuid) -> AccountingResult<DeletionReport> {
        warn!(company_id = %company_id, "Wiping company financial data");

        let outcome = self
            .store
            .apply(wipe_plan(company_id))
            .await
            .map_err(constraint_error)?;
        let report = DeletionReport::from(outcome);

        for step in &report.steps {
            info!(company_id = %company_id, table = %step.table, rows = step.rows, "Wipe step");
        }
        info!(company_id = %company_id, rows = report.total_rows(), "Company financial data wiped");
        Ok(report)
    }

    /// Delete a project with its ledger transactions, invoices, time entries
    /// and assignments. Its trust accounts are detached and become orphans.
    pub async fn delete_project(&self, project_id: Uuid) -> AccountingResult<DeletionReport> {
        if self.store.get_project(project_id).await?.is_none() {
            return Err(AccountingError::not_found("project", project_id));
        }

        let outcome = self
            .store
            .apply(project_deletion_plan(project_id))
            .await
            .map_err(constraint_error)?;
        let report = DeletionReport::from(outcome);

        info!(
            project_id = %project_id,
            transactions = report.rows_for(LedgerTable::Transactions),
            orphaned_trust_accounts = report.rows_for(LedgerTable::TrustAccounts),
            "Project deleted"
        );
        Ok(report)
    }
}
