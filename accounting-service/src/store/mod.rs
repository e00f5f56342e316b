//! Persistence seam of the ledger
//!
//! Every write goes through [`LedgerStore::apply`]: an ordered batch of
//! mutations that is committed entirely or not at all. Reads are plain
//! queries and never observe a partially applied batch.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::*;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

/// Tables owned by the ledger store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTable {
    Accounts,
    Transactions,
    TransactionLines,
    TrustAccounts,
    TrustTransactions,
    Clients,
    Projects,
    Invoices,
    TimeEntries,
    ProjectAssignments,
    Settings,
}

impl LedgerTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerTable::Accounts => "accounts",
            LedgerTable::Transactions => "transactions",
            LedgerTable::TransactionLines => "transaction_lines",
            LedgerTable::TrustAccounts => "trust_accounts",
            LedgerTable::TrustTransactions => "trust_transactions",
            LedgerTable::Clients => "clients",
            LedgerTable::Projects => "projects",
            LedgerTable::Invoices => "invoices",
            LedgerTable::TimeEntries => "time_entries",
            LedgerTable::ProjectAssignments => "project_assignments",
            LedgerTable::Settings => "settings",
        }
    }
}

impl fmt::Display for LedgerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a child row when its parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnParentDelete {
    /// Parent delete fails while children exist; callers delete children first
    Restrict,
    /// The reference is cleared, leaving the child in place
    Detach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub child: LedgerTable,
    pub column: &'static str,
    pub parent: LedgerTable,
    pub on_parent_delete: OnParentDelete,
}

const fn restrict(child: LedgerTable, column: &'static str, parent: LedgerTable) -> Relationship {
    Relationship {
        child,
        column,
        parent,
        on_parent_delete: OnParentDelete::Restrict,
    }
}

/// Referential rules every store enforces. Nothing cascades implicitly.
pub const REFERENTIAL_POLICIES: &[Relationship] = &[
    restrict(LedgerTable::TransactionLines, "transaction_id", LedgerTable::Transactions),
    restrict(LedgerTable::TransactionLines, "account_id", LedgerTable::Accounts),
    restrict(LedgerTable::Transactions, "project_id", LedgerTable::Projects),
    restrict(LedgerTable::Transactions, "invoice_id", LedgerTable::Invoices),
    restrict(LedgerTable::Transactions, "time_entry_id", LedgerTable::TimeEntries),
    restrict(LedgerTable::TrustTransactions, "trust_account_id", LedgerTable::TrustAccounts),
    restrict(LedgerTable::TrustAccounts, "client_id", LedgerTable::Clients),
    Relationship {
        child: LedgerTable::TrustAccounts,
        column: "project_id",
        parent: LedgerTable::Projects,
        on_parent_delete: OnParentDelete::Detach,
    },
    restrict(LedgerTable::Invoices, "project_id", LedgerTable::Projects),
    restrict(LedgerTable::TimeEntries, "project_id", LedgerTable::Projects),
    restrict(LedgerTable::ProjectAssignments, "project_id", LedgerTable::Projects),
    restrict(LedgerTable::Projects, "client_id", LedgerTable::Clients),
];

/// Rows selected by company or by project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Company(Uuid),
    Project(Uuid),
}

/// Trust rows selected by company or by a single trust account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustScope {
    Company(Uuid),
    Account(Uuid),
}

/// One step of a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    InsertAccount(Account),
    UpdateAccount(Account),
    DeleteAccounts { company_id: Uuid },

    /// Inserts the transaction header and all of its lines
    InsertTransaction(Transaction),
    /// Project scope covers transactions tagged with the project or sourced
    /// from one of its invoices or time entries
    DeleteTransactionLines(Scope),
    DeleteTransactions(Scope),

    InsertTrustAccount(TrustAccount),
    /// Adds `entry.amount` to the account balance and records the entry.
    /// With a floor, fails with a check violation if the result would drop below it.
    PostTrustTransaction {
        entry: TrustTransaction,
        floor: Option<Decimal>,
    },
    DetachTrustAccounts { project_id: Uuid },
    DeleteTrustTransactions(TrustScope),
    DeleteTrustAccounts(TrustScope),

    InsertClient(Client),
    InsertProject(Project),
    InsertInvoice(Invoice),
    InsertTimeEntry(TimeEntry),
    InsertAssignment(ProjectAssignment),
    DeleteInvoices(Scope),
    DeleteTimeEntries(Scope),
    DeleteAssignments(Scope),
    DeleteProjects(Scope),
    DeleteClients { company_id: Uuid },

    UpsertSetting(Setting),
}

impl Mutation {
    pub fn table(&self) -> LedgerTable {
        match self {
            Mutation::InsertAccount(_)
            | Mutation::UpdateAccount(_)
            | Mutation::DeleteAccounts { .. } => LedgerTable::Accounts,
            Mutation::InsertTransaction(_) | Mutation::DeleteTransactions(_) => {
                LedgerTable::Transactions
            }
            Mutation::DeleteTransactionLines(_) => LedgerTable::TransactionLines,
            Mutation::InsertTrustAccount(_)
            | Mutation::DetachTrustAccounts { .. }
            | Mutation::DeleteTrustAccounts(_) => LedgerTable::TrustAccounts,
            Mutation::PostTrustTransaction { .. } | Mutation::DeleteTrustTransactions(_) => {
                LedgerTable::TrustTransactions
            }
            Mutation::InsertClient(_) | Mutation::DeleteClients { .. } => LedgerTable::Clients,
            Mutation::InsertProject(_) | Mutation::DeleteProjects(_) => LedgerTable::Projects,
            Mutation::InsertInvoice(_) | Mutation::DeleteInvoices(_) => LedgerTable::Invoices,
            Mutation::InsertTimeEntry(_) | Mutation::DeleteTimeEntries(_) => {
                LedgerTable::TimeEntries
            }
            Mutation::InsertAssignment(_) | Mutation::DeleteAssignments(_) => {
                LedgerTable::ProjectAssignments
            }
            Mutation::UpsertSetting(_) => LedgerTable::Settings,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Mutation::DeleteAccounts { .. }
                | Mutation::DeleteTransactionLines(_)
                | Mutation::DeleteTransactions(_)
                | Mutation::DeleteTrustTransactions(_)
                | Mutation::DeleteTrustAccounts(_)
                | Mutation::DeleteInvoices(_)
                | Mutation::DeleteTimeEntries(_)
                | Mutation::DeleteAssignments(_)
                | Mutation::DeleteProjects(_)
                | Mutation::DeleteClients { .. }
        )
    }
}

/// Ordered mutations applied as one atomic unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

impl IntoIterator for WriteBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

impl FromIterator<Mutation> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self {
            mutations: iter.into_iter().collect(),
        }
    }
}

/// Rows touched by one step of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub table: LedgerTable,
    pub rows: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub steps: Vec<StepOutcome>,
}

impl BatchOutcome {
    pub fn record(&mut self, table: LedgerTable, rows: u64) {
        self.steps.push(StepOutcome { table, rows });
    }

    /// Rows touched in `table` across all steps
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

/// Storage backend for accounts, ledger, trust subledger, practice records and settings
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Apply every mutation in order inside one transaction
    async fn apply(&self, batch: WriteBatch) -> StoreResult<BatchOutcome>;

    // Chart of accounts
    async fn get_account(&self, account_id: Uuid) -> StoreResult<Option<Account>>;
    async fn find_account_by_code(&self, company_id: Uuid, code: &str) -> StoreResult<Option<Account>>;
    /// Accounts in insertion order
    async fn list_accounts(&self, company_id: Uuid) -> StoreResult<Vec<Account>>;
    /// Accounts of the company referenced by at least one transaction line
    async fn referenced_account_ids(&self, company_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // General ledger
    async fn get_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>>;
    /// Lines on accounts whose code starts with the prefix; ties on date keep insertion order
    async fn query_cash_lines(&self, query: &CashLineQuery) -> StoreResult<Vec<CashLine>>;
    /// Every account of the company with the sum of its line amounts
    async fn account_balances(&self, company_id: Uuid) -> StoreResult<Vec<AccountBalance>>;
    /// Sum of line amounts in `currency` on accounts whose code starts with the prefix
    async fn prefix_balance(&self, company_id: Uuid, code_prefix: &str, currency: &str) -> StoreResult<Decimal>;

    // Trust subledger
    async fn get_trust_account(&self, trust_account_id: Uuid) -> StoreResult<Option<TrustAccount>>;
    async fn find_trust_account(&self, key: &TrustAccountKey) -> StoreResult<Option<TrustAccount>>;
    /// Trust accounts without a live project
    async fn list_orphan_trust_accounts(&self) -> StoreResult<Vec<TrustAccount>>;
    async fn list_trust_transactions(&self, trust_account_id: Uuid) -> StoreResult<Vec<TrustTransaction>>;
    /// Sum of trust balances in `currency` for the company's clients
    async fn trust_balance_total(&self, company_id: Uuid, currency: &str) -> StoreResult<Decimal>;

    // Practice records
    async fn get_client(&self, client_id: Uuid) -> StoreResult<Option<Client>>;
    async fn get_project(&self, project_id: Uuid) -> StoreResult<Option<Project>>;
    async fn get_invoice(&self, invoice_id: Uuid) -> StoreResult<Option<Invoice>>;
    async fn get_time_entry(&self, time_entry_id: Uuid) -> StoreResult<Option<TimeEntry>>;
    async fn list_assignments(&self, project_id: Uuid) -> StoreResult<Vec<ProjectAssignment>>;

    // Settings
    async fn get_setting(&self, key: &str) -> StoreResult<Option<Setting>>;
}
