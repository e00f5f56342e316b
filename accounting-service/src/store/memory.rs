use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::{BatchOutcome, LedgerStore, Mutation, Scope, TrustScope, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::models::*;

#[derive(Debug, Clone, Default)]
struct State {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    trust_accounts: Vec<TrustAccount>,
    trust_transactions: Vec<TrustTransaction>,
    clients: Vec<Client>,
    projects: Vec<Project>,
    invoices: Vec<Invoice>,
    time_entries: Vec<TimeEntry>,
    assignments: Vec<ProjectAssignment>,
    settings: BTreeMap<String, Setting>,
}

// (date, insertion sequence, line number)
type CashLineKey = (chrono::NaiveDate, usize, usize);

#[derive(Debug, Default)]
struct Faults {
    fail_batch_after: Option<usize>,
    hidden_trust_reads: usize,
    unavailable: bool,
}

/// In-memory ledger store for testing and development.
///
/// Batches run against a copy of the state that replaces the live state only
/// when every step succeeded, so a failing step leaves nothing behind.
/// Referential and uniqueness rules match the PostgreSQL schema.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
    faults: Mutex<Faults>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch fail once `steps` of its mutations have been applied
    pub fn fail_next_batch_after(&self, steps: usize) {
        self.faults.lock().fail_batch_after = Some(steps);
    }

    /// Make the next `reads` trust account lookups miss, as a concurrent writer's
    /// uncommitted row would
    pub fn hide_trust_accounts_for(&self, reads: usize) {
        self.faults.lock().hidden_trust_reads = reads;
    }

    /// Fail every call with a backend error until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.lock().unavailable = unavailable;
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.faults.lock().unavailable {
            return Err(StoreError::Backend("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> StoreResult<T> {
        self.check_available()?;
        Ok(f(&self.state.read()))
    }

    fn apply_batch(&self, batch: WriteBatch) -> StoreResult<BatchOutcome> {
        self.check_available()?;
        let fail_after = self.faults.lock().fail_batch_after.take();

        let mut live = self.state.write();
        let mut draft = live.clone();
        let mut outcome = BatchOutcome::default();

        for (step, mutation) in batch.into_iter().enumerate() {
            if fail_after == Some(step) {
                return Err(StoreError::Backend(format!(
                    "injected failure before step {}",
                    step + 1
                )));
            }
            let table = mutation.table();
            let rows = draft.apply(mutation)?;
            outcome.record(table, rows);
        }

        *live = draft;
        Ok(outcome)
    }
}

fn fk(constraint: &str) -> StoreError {
    StoreError::ForeignKeyViolation(constraint.to_string())
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation(constraint.to_string())
}

fn remove_where<T>(rows: &mut Vec<T>, mut pred: impl FnMut(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|row| !pred(row));
    (before - rows.len()) as u64
}

impl State {
    fn client_ids(&self, company_id: Uuid) -> HashSet<Uuid> {
        self.clients
            .iter()
            .filter(|c| c.company_id == company_id)
            .map(|c| c.id)
            .collect()
    }

    fn project_ids(&self, scope: Scope) -> HashSet<Uuid> {
        match scope {
            Scope::Project(project_id) => HashSet::from([project_id]),
            Scope::Company(company_id) => {
                let clients = self.client_ids(company_id);
                self.projects
                    .iter()
                    .filter(|p| clients.contains(&p.client_id))
                    .map(|p| p.id)
                    .collect()
            }
        }
    }

    fn transaction_ids(&self, scope: Scope) -> HashSet<Uuid> {
        match scope {
            Scope::Company(company_id) => self
                .transactions
                .iter()
                .filter(|t| t.company_id == company_id)
                .map(|t| t.id)
                .collect(),
            Scope::Project(project_id) => {
                let invoices: HashSet<Uuid> = self
                    .invoices
                    .iter()
                    .filter(|i| i.project_id == project_id)
                    .map(|i| i.id)
                    .collect();
                let time_entries: HashSet<Uuid> = self
                    .time_entries
                    .iter()
                    .filter(|e| e.project_id == project_id)
                    .map(|e| e.id)
                    .collect();
                self.transactions
                    .iter()
                    .filter(|t| {
                        t.project_id == Some(project_id)
                            || match t.source {
                                Some(SourceDocument::Invoice(id)) => invoices.contains(&id),
                                Some(SourceDocument::TimeEntry(id)) => time_entries.contains(&id),
                                None => false,
                            }
                    })
                    .map(|t| t.id)
                    .collect()
            }
        }
    }

    fn trust_account_ids(&self, scope: TrustScope) -> HashSet<Uuid> {
        match scope {
            TrustScope::Account(id) => HashSet::from([id]),
            TrustScope::Company(company_id) => {
                let clients = self.client_ids(company_id);
                self.trust_accounts
                    .iter()
                    .filter(|t| clients.contains(&t.client_id))
                    .map(|t| t.id)
                    .collect()
            }
        }
    }

    fn account_is_referenced(&self, ids: &HashSet<Uuid>) -> bool {
        self.transactions
            .iter()
            .flat_map(|t| t.lines.iter())
            .any(|l| ids.contains(&l.account_id))
    }

    fn project_exists(&self, project_id: Uuid) -> bool {
        self.projects.iter().any(|p| p.id == project_id)
    }

    fn apply(&mut self, mutation: Mutation) -> StoreResult<u64> {
        match mutation {
            Mutation::InsertAccount(account) => {
                if self.accounts.iter().any(|a| a.id == account.id) {
                    return Err(unique("accounts_pkey"));
                }
                if self
                    .accounts
                    .iter()
                    .any(|a| a.company_id == account.company_id && a.code == account.code)
                {
                    return Err(unique("accounts_company_code_key"));
                }
                self.accounts.push(account);
                Ok(1)
            }
            Mutation::UpdateAccount(account) => {
                if self.accounts.iter().any(|a| {
                    a.id != account.id && a.company_id == account.company_id && a.code == account.code
                }) {
                    return Err(unique("accounts_company_code_key"));
                }
                match self.accounts.iter_mut().find(|a| a.id == account.id) {
                    Some(existing) => {
                        *existing = account;
                        Ok(1)
                    }
                    None => Ok(0),
                }
            }
            Mutation::DeleteAccounts { company_id } => {
                let ids: HashSet<Uuid> = self
                    .accounts
                    .iter()
                    .filter(|a| a.company_id == company_id)
                    .map(|a| a.id)
                    .collect();
                if self.account_is_referenced(&ids) {
                    return Err(fk("transaction_lines_account_id_fkey"));
                }
                Ok(remove_where(&mut self.accounts, |a| ids.contains(&a.id)))
            }

            Mutation::InsertTransaction(transaction) => {
                if self.transactions.iter().any(|t| t.id == transaction.id) {
                    return Err(unique("transactions_pkey"));
                }
                for line in &transaction.lines {
                    if !self.accounts.iter().any(|a| a.id == line.account_id) {
                        return Err(fk("transaction_lines_account_id_fkey"));
                    }
                }
                if let Some(project_id) = transaction.project_id {
                    if !self.project_exists(project_id) {
                        return Err(fk("transactions_project_id_fkey"));
                    }
                }
                match transaction.source {
                    Some(SourceDocument::Invoice(id)) if !self.invoices.iter().any(|i| i.id == id) => {
                        return Err(fk("transactions_invoice_id_fkey"));
                    }
                    Some(SourceDocument::TimeEntry(id))
                        if !self.time_entries.iter().any(|e| e.id == id) =>
                    {
                        return Err(fk("transactions_time_entry_id_fkey"));
                    }
                    _ => {}
                }
                self.transactions.push(transaction);
                Ok(1)
            }
            Mutation::DeleteTransactionLines(scope) => {
                let ids = self.transaction_ids(scope);
                let mut removed = 0;
                for transaction in self.transactions.iter_mut().filter(|t| ids.contains(&t.id)) {
                    removed += transaction.lines.len() as u64;
                    transaction.lines.clear();
                }
                Ok(removed)
            }
            Mutation::DeleteTransactions(scope) => {
                let ids = self.transaction_ids(scope);
                if self
                    .transactions
                    .iter()
                    .any(|t| ids.contains(&t.id) && !t.lines.is_empty())
                {
                    return Err(fk("transaction_lines_transaction_id_fkey"));
                }
                Ok(remove_where(&mut self.transactions, |t| ids.contains(&t.id)))
            }

            Mutation::InsertTrustAccount(account) => {
                if !self.clients.iter().any(|c| c.id == account.client_id) {
                    return Err(fk("trust_accounts_client_id_fkey"));
                }
                if let Some(project_id) = account.project_id {
                    if !self.project_exists(project_id) {
                        return Err(fk("trust_accounts_project_id_fkey"));
                    }
                }
                let key = account.key();
                if self
                    .trust_accounts
                    .iter()
                    .any(|t| t.id == account.id || (key.is_some() && t.key() == key))
                {
                    return Err(unique("trust_accounts_project_type_currency_key"));
                }
                self.trust_accounts.push(account);
                Ok(1)
            }
            Mutation::PostTrustTransaction { entry, floor } => {
                let account = self
                    .trust_accounts
                    .iter_mut()
                    .find(|t| t.id == entry.trust_account_id)
                    .ok_or_else(|| fk("trust_transactions_trust_account_id_fkey"))?;
                let balance = account.balance.checked_add(entry.amount).ok_or_else(|| {
                    StoreError::Backend(format!("numeric overflow on trust account {}", account.id))
                })?;
                if let Some(floor) = floor {
                    if balance < floor {
                        return Err(StoreError::CheckViolation(format!(
                            "trust account {} balance {} below floor {}",
                            account.id, balance, floor
                        )));
                    }
                }
                account.balance = balance;
                self.trust_transactions.push(entry);
                Ok(1)
            }
            Mutation::DetachTrustAccounts { project_id } => {
                let mut detached = 0;
                for account in self
                    .trust_accounts
                    .iter_mut()
                    .filter(|t| t.project_id == Some(project_id))
                {
                    account.project_id = None;
                    detached += 1;
                }
                Ok(detached)
            }
            Mutation::DeleteTrustTransactions(scope) => {
                let ids = self.trust_account_ids(scope);
                Ok(remove_where(&mut self.trust_transactions, |e| {
                    ids.contains(&e.trust_account_id)
                }))
            }
            Mutation::DeleteTrustAccounts(scope) => {
                let ids = self.trust_account_ids(scope);
                if self
                    .trust_transactions
                    .iter()
                    .any(|e| ids.contains(&e.trust_account_id))
                {
                    return Err(fk("trust_transactions_trust_account_id_fkey"));
                }
                Ok(remove_where(&mut self.trust_accounts, |t| ids.contains(&t.id)))
            }

            Mutation::InsertClient(client) => {
                if self.clients.iter().any(|c| c.id == client.id) {
                    return Err(unique("clients_pkey"));
                }
                self.clients.push(client);
                Ok(1)
            }
            Mutation::InsertProject(project) => {
                if !self.clients.iter().any(|c| c.id == project.client_id) {
                    return Err(fk("projects_client_id_fkey"));
                }
                if self.project_exists(project.id) {
                    return Err(unique("projects_pkey"));
                }
                self.projects.push(project);
                Ok(1)
            }
            Mutation::InsertInvoice(invoice) => {
                if !self.project_exists(invoice.project_id) {
                    return Err(fk("invoices_project_id_fkey"));
                }
                self.invoices.push(invoice);
                Ok(1)
            }
            Mutation::InsertTimeEntry(entry) => {
                if !self.project_exists(entry.project_id) {
                    return Err(fk("time_entries_project_id_fkey"));
                }
                self.time_entries.push(entry);
                Ok(1)
            }
            Mutation::InsertAssignment(assignment) => {
                if !self.project_exists(assignment.project_id) {
                    return Err(fk("project_assignments_project_id_fkey"));
                }
                if self.assignments.iter().any(|a| {
                    a.project_id == assignment.project_id && a.lawyer_id == assignment.lawyer_id
                }) {
                    return Err(unique("project_assignments_project_lawyer_key"));
                }
                self.assignments.push(assignment);
                Ok(1)
            }
            Mutation::DeleteInvoices(scope) => {
                let projects = self.project_ids(scope);
                let ids: HashSet<Uuid> = self
                    .invoices
                    .iter()
                    .filter(|i| projects.contains(&i.project_id))
                    .map(|i| i.id)
                    .collect();
                if self.transactions.iter().any(
                    |t| matches!(t.source, Some(SourceDocument::Invoice(id)) if ids.contains(&id)),
                ) {
                    return Err(fk("transactions_invoice_id_fkey"));
                }
                Ok(remove_where(&mut self.invoices, |i| ids.contains(&i.id)))
            }
            Mutation::DeleteTimeEntries(scope) => {
                let projects = self.project_ids(scope);
                let ids: HashSet<Uuid> = self
                    .time_entries
                    .iter()
                    .filter(|e| projects.contains(&e.project_id))
                    .map(|e| e.id)
                    .collect();
                if self.transactions.iter().any(
                    |t| matches!(t.source, Some(SourceDocument::TimeEntry(id)) if ids.contains(&id)),
                ) {
                    return Err(fk("transactions_time_entry_id_fkey"));
                }
                Ok(remove_where(&mut self.time_entries, |e| ids.contains(&e.id)))
            }
            Mutation::DeleteAssignments(scope) => {
                let projects = self.project_ids(scope);
                Ok(remove_where(&mut self.assignments, |a| {
                    projects.contains(&a.project_id)
                }))
            }
            Mutation::DeleteProjects(scope) => {
                let ids = self.project_ids(scope);
                let referenced = self.invoices.iter().any(|i| ids.contains(&i.project_id))
                    || self.time_entries.iter().any(|e| ids.contains(&e.project_id))
                    || self.assignments.iter().any(|a| ids.contains(&a.project_id))
                    || self
                        .transactions
                        .iter()
                        .any(|t| t.project_id.is_some_and(|p| ids.contains(&p)))
                    || self
                        .trust_accounts
                        .iter()
                        .any(|t| t.project_id.is_some_and(|p| ids.contains(&p)));
                if referenced {
                    return Err(fk("projects_referenced"));
                }
                Ok(remove_where(&mut self.projects, |p| ids.contains(&p.id)))
            }
            Mutation::DeleteClients { company_id } => {
                let ids = self.client_ids(company_id);
                if self.projects.iter().any(|p| ids.contains(&p.client_id)) {
                    return Err(fk("projects_client_id_fkey"));
                }
                if self.trust_accounts.iter().any(|t| ids.contains(&t.client_id)) {
                    return Err(fk("trust_accounts_client_id_fkey"));
                }
                Ok(remove_where(&mut self.clients, |c| ids.contains(&c.id)))
            }

            Mutation::UpsertSetting(setting) => {
                self.settings.insert(setting.key.clone(), setting);
                Ok(1)
            }
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn apply(&self, batch: WriteBatch) -> StoreResult<BatchOutcome> {
        self.apply_batch(batch)
    }

    async fn get_account(&self, account_id: Uuid) -> StoreResult<Option<Account>> {
        self.read(|s| s.accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn find_account_by_code(&self, company_id: Uuid, code: &str) -> StoreResult<Option<Account>> {
        self.read(|s| {
            s.accounts
                .iter()
                .find(|a| a.company_id == company_id && a.code == code)
                .cloned()
        })
    }

    async fn list_accounts(&self, company_id: Uuid) -> StoreResult<Vec<Account>> {
        self.read(|s| {
            s.accounts
                .iter()
                .filter(|a| a.company_id == company_id)
                .cloned()
                .collect()
        })
    }

    async fn referenced_account_ids(&self, company_id: Uuid) -> StoreResult<Vec<Uuid>> {
        self.read(|s| {
            s.accounts
                .iter()
                .filter(|a| a.company_id == company_id)
                .filter(|a| s.account_is_referenced(&HashSet::from([a.id])))
                .map(|a| a.id)
                .collect()
        })
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        self.read(|s| s.transactions.iter().find(|t| t.id == transaction_id).cloned())
    }

    async fn query_cash_lines(&self, query: &CashLineQuery) -> StoreResult<Vec<CashLine>> {
        self.read(|s| {
            let mut rows: Vec<(CashLineKey, CashLine)> = Vec::new();
            for (seq, transaction) in s
                .transactions
                .iter()
                .enumerate()
                .filter(|(_, t)| t.company_id == query.company_id)
            {
                for (line_no, line) in transaction.lines.iter().enumerate() {
                    let Some(account) = s.accounts.iter().find(|a| a.id == line.account_id) else {
                        continue;
                    };
                    if !account.code.starts_with(&query.account_code_prefix) {
                        continue;
                    }
                    rows.push((
                        (transaction.date, seq, line_no),
                        CashLine {
                            line_id: line.id,
                            transaction_id: transaction.id,
                            date: transaction.date,
                            currency: transaction.currency.clone(),
                            description: transaction.description.clone(),
                            memo: line.memo.clone(),
                            amount: line.amount,
                            account_id: account.id,
                            account_code: account.code.clone(),
                            account_name: account.name.clone(),
                        },
                    ));
                }
            }

            rows.sort_by(|(a, _), (b, _)| match query.order {
                SortOrder::Ascending => a.cmp(b),
                SortOrder::Descending => b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)),
            });
            rows.into_iter()
                .take(query.limit)
                .map(|(_, line)| line)
                .collect()
        })
    }

    async fn account_balances(&self, company_id: Uuid) -> StoreResult<Vec<AccountBalance>> {
        self.read(|s| {
            s.accounts
                .iter()
                .filter(|a| a.company_id == company_id)
                .map(|account| {
                    let balance = s
                        .transactions
                        .iter()
                        .flat_map(|t| t.lines.iter())
                        .filter(|l| l.account_id == account.id)
                        .map(|l| l.amount)
                        .sum();
                    AccountBalance {
                        account: account.clone(),
                        balance,
                    }
                })
                .collect()
        })
    }

    async fn prefix_balance(&self, company_id: Uuid, code_prefix: &str, currency: &str) -> StoreResult<Decimal> {
        self.read(|s| {
            let accounts: HashSet<Uuid> = s
                .accounts
                .iter()
                .filter(|a| a.company_id == company_id && a.code.starts_with(code_prefix))
                .map(|a| a.id)
                .collect();
            s.transactions
                .iter()
                .filter(|t| t.company_id == company_id && t.currency == currency)
                .flat_map(|t| t.lines.iter())
                .filter(|l| accounts.contains(&l.account_id))
                .map(|l| l.amount)
                .sum()
        })
    }

    async fn get_trust_account(&self, trust_account_id: Uuid) -> StoreResult<Option<TrustAccount>> {
        self.read(|s| {
            s.trust_accounts
                .iter()
                .find(|t| t.id == trust_account_id)
                .cloned()
        })
    }

    async fn find_trust_account(&self, key: &TrustAccountKey) -> StoreResult<Option<TrustAccount>> {
        self.check_available()?;
        {
            let mut faults = self.faults.lock();
            if faults.hidden_trust_reads > 0 {
                faults.hidden_trust_reads -= 1;
                return Ok(None);
            }
        }
        self.read(|s| {
            s.trust_accounts
                .iter()
                .find(|t| t.key().as_ref() == Some(key))
                .cloned()
        })
    }

    async fn list_orphan_trust_accounts(&self) -> StoreResult<Vec<TrustAccount>> {
        self.read(|s| {
            s.trust_accounts
                .iter()
                .filter(|t| match t.project_id {
                    None => true,
                    Some(project_id) => !s.project_exists(project_id),
                })
                .cloned()
                .collect()
        })
    }

    async fn list_trust_transactions(&self, trust_account_id: Uuid) -> StoreResult<Vec<TrustTransaction>> {
        self.read(|s| {
            s.trust_transactions
                .iter()
                .filter(|e| e.trust_account_id == trust_account_id)
                .cloned()
                .collect()
        })
    }

    async fn trust_balance_total(&self, company_id: Uuid, currency: &str) -> StoreResult<Decimal> {
        self.read(|s| {
            let clients = s.client_ids(company_id);
            s.trust_accounts
                .iter()
                .filter(|t| clients.contains(&t.client_id) && t.currency == currency)
                .map(|t| t.balance)
                .sum()
        })
    }

    async fn get_client(&self, client_id: Uuid) -> StoreResult<Option<Client>> {
        self.read(|s| s.clients.iter().find(|c| c.id == client_id).cloned())
    }

    async fn get_project(&self, project_id: Uuid) -> StoreResult<Option<Project>> {
        self.read(|s| s.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> StoreResult<Option<Invoice>> {
        self.read(|s| s.invoices.iter().find(|i| i.id == invoice_id).cloned())
    }

    async fn get_time_entry(&self, time_entry_id: Uuid) -> StoreResult<Option<TimeEntry>> {
        self.read(|s| s.time_entries.iter().find(|e| e.id == time_entry_id).cloned())
    }

    async fn list_assignments(&self, project_id: Uuid) -> StoreResult<Vec<ProjectAssignment>> {
        self.read(|s| {
            s.assignments
                .iter()
                .filter(|a| a.project_id == project_id)
                .cloned()
                .collect()
        })
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<Setting>> {
        self.read(|s| s.settings.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn account(company_id: Uuid, code: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            company_id,
            code: code.to_string(),
            name: format!("Account {}", code),
            account_type: AccountType::Asset,
        }
    }

    fn setting(key: &str, value: &str) -> Setting {
        Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn failed_step_discards_the_whole_batch() {
        let store = InMemoryLedgerStore::new();
        let company = Uuid::new_v4();
        let first = account(company, "1000");
        let mut clash = account(company, "1000");
        clash.name = "Duplicate".into();

        let batch = WriteBatch::new()
            .with(Mutation::InsertAccount(first))
            .with(Mutation::UpsertSetting(setting("EX_RATE_USD_EUR", "0.9")))
            .with(Mutation::InsertAccount(clash));

        let err = store.apply(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert!(store.list_accounts(company).await.unwrap().is_empty());
        assert!(store.get_setting("EX_RATE_USD_EUR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let store = InMemoryLedgerStore::new();
        store.fail_next_batch_after(1);

        let batch = WriteBatch::new()
            .with(Mutation::UpsertSetting(setting("a", "1")))
            .with(Mutation::UpsertSetting(setting("b", "2")));
        assert!(store.apply(batch.clone()).await.is_err());
        assert!(store.get_setting("a").await.unwrap().is_none());

        let outcome = store.apply(batch).await.unwrap();
        assert_eq!(outcome.total_rows(), 2);
    }

    #[tokio::test]
    async fn referenced_accounts_cannot_be_deleted() {
        let store = InMemoryLedgerStore::new();
        let company = Uuid::new_v4();
        let cash = account(company, "1000");
        let income = account(company, "4000");
        let transaction_id = Uuid::new_v4();
        let line = |account_id, amount| TransactionLine {
            id: Uuid::new_v4(),
            transaction_id,
            account_id,
            amount,
            memo: None,
        };
        let transaction = Transaction {
            id: transaction_id,
            company_id: company,
            date: Utc::now().date_naive(),
            currency: "USD".into(),
            description: String::new(),
            project_id: None,
            source: None,
            lines: vec![line(cash.id, dec!(10)), line(income.id, dec!(-10))],
        };

        store
            .apply(
                WriteBatch::new()
                    .with(Mutation::InsertAccount(cash))
                    .with(Mutation::InsertAccount(income))
                    .with(Mutation::InsertTransaction(transaction)),
            )
            .await
            .unwrap();

        let err = store
            .apply(WriteBatch::new().with(Mutation::DeleteAccounts { company_id: company }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
        assert_eq!(store.referenced_account_ids(company).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unavailable_store_fails_reads_and_writes() {
        let store = InMemoryLedgerStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get_setting("x").await,
            Err(StoreError::Backend(_))
        ));
        store.set_unavailable(false);
        assert!(store.get_setting("x").await.unwrap().is_none());
    }
}
