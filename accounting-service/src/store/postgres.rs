//! PostgreSQL-backed ledger store
//!
//! Each [`WriteBatch`] runs in a single database transaction; the first
//! failing statement aborts it and nothing is committed. Constraint
//! violations come back classified by SQLSTATE.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{DatabaseError, DatabasePool, TransactionManager};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use super::{BatchOutcome, LedgerStore, Mutation, Scope, TrustScope, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::models::*;

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(detail) => StoreError::UniqueViolation(detail),
            DatabaseError::ForeignKeyViolation(detail) => StoreError::ForeignKeyViolation(detail),
            DatabaseError::CheckViolation(detail) => StoreError::CheckViolation(detail),
            DatabaseError::StatementTimeout(detail) => StoreError::Timeout(detail),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    DatabaseError::from(err).into()
}

// Transactions belonging to a project, directly or through its invoices and time entries
const PROJECT_TRANSACTIONS: &str = "SELECT id FROM transactions WHERE project_id = $1 \
     OR invoice_id IN (SELECT id FROM invoices WHERE project_id = $1) \
     OR time_entry_id IN (SELECT id FROM time_entries WHERE project_id = $1)";

const COMPANY_PROJECTS: &str = "SELECT p.id FROM projects p \
     JOIN clients c ON c.id = p.client_id WHERE c.company_id = $1";

const COMPANY_TRUST_ACCOUNTS: &str = "SELECT ta.id FROM trust_accounts ta \
     JOIN clients c ON c.id = ta.client_id WHERE c.company_id = $1";

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    company_id: Uuid,
    code: String,
    name: String,
    account_type: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> StoreResult<Self> {
        let account_type = AccountType::from_str(&row.account_type)
            .map_err(|e| StoreError::Backend(format!("account {}: {}", row.id, e)))?;
        Ok(Account {
            id: row.id,
            company_id: row.company_id,
            code: row.code,
            name: row.name,
            account_type,
        })
    }
}

#[derive(FromRow)]
struct AccountBalanceRow {
    #[sqlx(flatten)]
    account: AccountRow,
    balance: Decimal,
}

#[derive(FromRow)]
struct TransactionRow {
    id: Uuid,
    company_id: Uuid,
    transaction_date: NaiveDate,
    currency: String,
    description: String,
    project_id: Option<Uuid>,
    invoice_id: Option<Uuid>,
    time_entry_id: Option<Uuid>,
}

#[derive(FromRow)]
struct LineRow {
    id: Uuid,
    transaction_id: Uuid,
    account_id: Uuid,
    amount: Decimal,
    memo: Option<String>,
}

#[derive(FromRow)]
struct CashLineRow {
    line_id: Uuid,
    transaction_id: Uuid,
    transaction_date: NaiveDate,
    currency: String,
    description: String,
    memo: Option<String>,
    amount: Decimal,
    account_id: Uuid,
    account_code: String,
    account_name: String,
}

#[derive(FromRow)]
struct TrustAccountRow {
    id: Uuid,
    client_id: Uuid,
    project_id: Option<Uuid>,
    currency: String,
    account_type: String,
    balance: Decimal,
}

impl TryFrom<TrustAccountRow> for TrustAccount {
    type Error = StoreError;

    fn try_from(row: TrustAccountRow) -> StoreResult<Self> {
        let account_type = TrustAccountType::from_str(&row.account_type)
            .map_err(|e| StoreError::Backend(format!("trust account {}: {}", row.id, e)))?;
        Ok(TrustAccount {
            id: row.id,
            client_id: row.client_id,
            project_id: row.project_id,
            currency: row.currency.trim().to_string(),
            account_type,
            balance: row.balance,
        })
    }
}

#[derive(FromRow)]
struct TrustTransactionRow {
    id: Uuid,
    trust_account_id: Uuid,
    amount: Decimal,
    transaction_date: NaiveDate,
    memo: String,
}

#[derive(FromRow)]
struct SettingRow {
    key: String,
    value: String,
    updated_at: DateTime<Utc>,
}

/// PostgreSQL-backed ledger store
pub struct PostgresLedgerStore {
    transactions: TransactionManager,
}

impl PostgresLedgerStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            transactions: TransactionManager::new(pool),
        }
    }

    fn pool(&self) -> &sqlx::PgPool {
        self.transactions.pool().pool()
    }

    async fn execute(conn: &mut PgConnection, mutation: Mutation) -> StoreResult<u64> {
        let result = match mutation {
            Mutation::InsertAccount(account) => sqlx::query(
                "INSERT INTO accounts (id, company_id, code, name, account_type) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(account.id)
            .bind(account.company_id)
            .bind(&account.code)
            .bind(&account.name)
            .bind(account.account_type.as_str())
            .execute(&mut *conn)
            .await,
            Mutation::UpdateAccount(account) => sqlx::query(
                "UPDATE accounts SET code = $2, name = $3, account_type = $4 WHERE id = $1",
            )
            .bind(account.id)
            .bind(&account.code)
            .bind(&account.name)
            .bind(account.account_type.as_str())
            .execute(&mut *conn)
            .await,
            Mutation::DeleteAccounts { company_id } => {
                sqlx::query("DELETE FROM accounts WHERE company_id = $1")
                    .bind(company_id)
                    .execute(&mut *conn)
                    .await
            }

            Mutation::InsertTransaction(transaction) => {
                return Self::insert_transaction(conn, transaction).await;
            }
            Mutation::DeleteTransactionLines(scope) => {
                let (sql, id) = match scope {
                    Scope::Company(id) => (
                        "DELETE FROM transaction_lines WHERE transaction_id IN \
                         (SELECT id FROM transactions WHERE company_id = $1)"
                            .to_string(),
                        id,
                    ),
                    Scope::Project(id) => (
                        format!(
                            "DELETE FROM transaction_lines WHERE transaction_id IN ({})",
                            PROJECT_TRANSACTIONS
                        ),
                        id,
                    ),
                };
                sqlx::query(&sql).bind(id).execute(&mut *conn).await
            }
            Mutation::DeleteTransactions(scope) => {
                let (sql, id) = match scope {
                    Scope::Company(id) => ("DELETE FROM transactions WHERE company_id = $1".to_string(), id),
                    Scope::Project(id) => (
                        format!("DELETE FROM transactions WHERE id IN ({})", PROJECT_TRANSACTIONS),
                        id,
                    ),
                };
                sqlx::query(&sql).bind(id).execute(&mut *conn).await
            }

            Mutation::InsertTrustAccount(account) => sqlx::query(
                "INSERT INTO trust_accounts (id, client_id, project_id, currency, account_type, balance) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(account.id)
            .bind(account.client_id)
            .bind(account.project_id)
            .bind(&account.currency)
            .bind(account.account_type.as_str())
            .bind(account.balance)
            .execute(&mut *conn)
            .await,
            Mutation::PostTrustTransaction { entry, floor } => {
                let updated = sqlx::query(
                    "UPDATE trust_accounts SET balance = balance + $2 \
                     WHERE id = $1 AND ($3::NUMERIC IS NULL OR balance + $2 >= $3)",
                )
                .bind(entry.trust_account_id)
                .bind(entry.amount)
                .bind(floor)
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
                if updated.rows_affected() == 0 {
                    return Err(StoreError::CheckViolation(format!(
                        "trust account {} missing or below floor",
                        entry.trust_account_id
                    )));
                }
                sqlx::query(
                    "INSERT INTO trust_transactions (id, trust_account_id, amount, transaction_date, memo) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(entry.id)
                .bind(entry.trust_account_id)
                .bind(entry.amount)
                .bind(entry.date)
                .bind(&entry.memo)
                .execute(&mut *conn)
                .await
            }
            Mutation::DetachTrustAccounts { project_id } => {
                sqlx::query("UPDATE trust_accounts SET project_id = NULL WHERE project_id = $1")
                    .bind(project_id)
                    .execute(&mut *conn)
                    .await
            }
            Mutation::DeleteTrustTransactions(scope) => {
                let (sql, id) = match scope {
                    TrustScope::Account(id) => (
                        "DELETE FROM trust_transactions WHERE trust_account_id = $1".to_string(),
                        id,
                    ),
                    TrustScope::Company(id) => (
                        format!(
                            "DELETE FROM trust_transactions WHERE trust_account_id IN ({})",
                            COMPANY_TRUST_ACCOUNTS
                        ),
                        id,
                    ),
                };
                sqlx::query(&sql).bind(id).execute(&mut *conn).await
            }
            Mutation::DeleteTrustAccounts(scope) => {
                let (sql, id) = match scope {
                    TrustScope::Account(id) => ("DELETE FROM trust_accounts WHERE id = $1".to_string(), id),
                    TrustScope::Company(id) => (
                        format!("DELETE FROM trust_accounts WHERE id IN ({})", COMPANY_TRUST_ACCOUNTS),
                        id,
                    ),
                };
                sqlx::query(&sql).bind(id).execute(&mut *conn).await
            }

            Mutation::InsertClient(client) => {
                sqlx::query("INSERT INTO clients (id, company_id, name) VALUES ($1, $2, $3)")
                    .bind(client.id)
                    .bind(client.company_id)
                    .bind(&client.name)
                    .execute(&mut *conn)
                    .await
            }
            Mutation::InsertProject(project) => {
                sqlx::query("INSERT INTO projects (id, client_id, name) VALUES ($1, $2, $3)")
                    .bind(project.id)
                    .bind(project.client_id)
                    .bind(&project.name)
                    .execute(&mut *conn)
                    .await
            }
            Mutation::InsertInvoice(invoice) => sqlx::query(
                "INSERT INTO invoices (id, project_id, number, amount, currency, issued_on) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(invoice.id)
            .bind(invoice.project_id)
            .bind(&invoice.number)
            .bind(invoice.amount)
            .bind(&invoice.currency)
            .bind(invoice.issued_on)
            .execute(&mut *conn)
            .await,
            Mutation::InsertTimeEntry(entry) => sqlx::query(
                "INSERT INTO time_entries (id, project_id, lawyer_id, hours, rate, worked_on, description) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(entry.id)
            .bind(entry.project_id)
            .bind(entry.lawyer_id)
            .bind(entry.hours)
            .bind(entry.rate)
            .bind(entry.worked_on)
            .bind(&entry.description)
            .execute(&mut *conn)
            .await,
            Mutation::InsertAssignment(assignment) => sqlx::query(
                "INSERT INTO project_assignments (id, project_id, lawyer_id, position) VALUES ($1, $2, $3, $4)",
            )
            .bind(assignment.id)
            .bind(assignment.project_id)
            .bind(assignment.lawyer_id)
            .bind(&assignment.position)
            .execute(&mut *conn)
            .await,
            Mutation::DeleteInvoices(scope) => {
                Self::delete_project_children(conn, "invoices", scope).await
            }
            Mutation::DeleteTimeEntries(scope) => {
                Self::delete_project_children(conn, "time_entries", scope).await
            }
            Mutation::DeleteAssignments(scope) => {
                Self::delete_project_children(conn, "project_assignments", scope).await
            }
            Mutation::DeleteProjects(scope) => {
                let (sql, id) = match scope {
                    Scope::Project(id) => ("DELETE FROM projects WHERE id = $1".to_string(), id),
                    Scope::Company(id) => (
                        "DELETE FROM projects WHERE client_id IN (SELECT id FROM clients WHERE company_id = $1)"
                            .to_string(),
                        id,
                    ),
                };
                sqlx::query(&sql).bind(id).execute(&mut *conn).await
            }
            Mutation::DeleteClients { company_id } => {
                sqlx::query("DELETE FROM clients WHERE company_id = $1")
                    .bind(company_id)
                    .execute(&mut *conn)
                    .await
            }

            Mutation::UpsertSetting(setting) => sqlx::query(
                "INSERT INTO settings (key, value, updated_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
            )
            .bind(&setting.key)
            .bind(&setting.value)
            .bind(setting.updated_at)
            .execute(&mut *conn)
            .await,
        };

        result.map(|r| r.rows_affected()).map_err(db_err)
    }

    async fn delete_project_children(
        conn: &mut PgConnection,
        table: &'static str,
        scope: Scope,
    ) -> Result<sqlx::postgres::PgQueryResult, sqlx::Error> {
        let (sql, id) = match scope {
            Scope::Project(id) => (format!("DELETE FROM {} WHERE project_id = $1", table), id),
            Scope::Company(id) => (
                format!("DELETE FROM {} WHERE project_id IN ({})", table, COMPANY_PROJECTS),
                id,
            ),
        };
        sqlx::query(&sql).bind(id).execute(&mut *conn).await
    }

    async fn insert_transaction(conn: &mut PgConnection, transaction: Transaction) -> StoreResult<u64> {
        let (invoice_id, time_entry_id) = match transaction.source {
            Some(SourceDocument::Invoice(id)) => (Some(id), None),
            Some(SourceDocument::TimeEntry(id)) => (None, Some(id)),
            None => (None, None),
        };

        sqlx::query(
            "INSERT INTO transactions \
             (id, company_id, transaction_date, currency, description, project_id, invoice_id, time_entry_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(transaction.id)
        .bind(transaction.company_id)
        .bind(transaction.date)
        .bind(&transaction.currency)
        .bind(&transaction.description)
        .bind(transaction.project_id)
        .bind(invoice_id)
        .bind(time_entry_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;

        for (line_no, line) in transaction.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO transaction_lines (id, transaction_id, account_id, line_no, amount, memo) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(line.id)
            .bind(transaction.id)
            .bind(line.account_id)
            .bind(line_no as i32)
            .bind(line.amount)
            .bind(&line.memo)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
        }

        Ok(1)
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn apply(&self, batch: WriteBatch) -> StoreResult<BatchOutcome> {
        debug!("Applying batch of {} mutations", batch.len());

        let mut tx = self.transactions.begin().await?;
        let mut outcome = BatchOutcome::default();
        for mutation in batch {
            let table = mutation.table();
            let rows = Self::execute(&mut *tx, mutation).await?;
            outcome.record(table, rows);
        }
        self.transactions.commit(tx).await?;

        Ok(outcome)
    }

    async fn get_account(&self, account_id: Uuid) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT id, company_id, code, name, account_type FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_account_by_code(&self, company_id: Uuid, code: &str) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT id, company_id, code, name, account_type FROM accounts \
             WHERE company_id = $1 AND code = $2",
        )
        .bind(company_id)
        .bind(code)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .map(Account::try_from)
        .transpose()
    }

    async fn list_accounts(&self, company_id: Uuid) -> StoreResult<Vec<Account>> {
        sqlx::query_as::<_, AccountRow>(
            "SELECT id, company_id, code, name, account_type FROM accounts \
             WHERE company_id = $1 ORDER BY seq",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?
        .into_iter()
        .map(Account::try_from)
        .collect()
    }

    async fn referenced_account_ids(&self, company_id: Uuid) -> StoreResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT a.id FROM accounts a WHERE a.company_id = $1 \
             AND EXISTS (SELECT 1 FROM transaction_lines tl WHERE tl.account_id = a.id) \
             ORDER BY a.seq",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        let Some(row) = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, company_id, transaction_date, currency, description, project_id, invoice_id, time_entry_id \
             FROM transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineRow>(
            "SELECT id, transaction_id, account_id, amount, memo FROM transaction_lines \
             WHERE transaction_id = $1 ORDER BY line_no",
        )
        .bind(transaction_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        let source = match (row.invoice_id, row.time_entry_id) {
            (Some(id), _) => Some(SourceDocument::Invoice(id)),
            (None, Some(id)) => Some(SourceDocument::TimeEntry(id)),
            (None, None) => None,
        };

        Ok(Some(Transaction {
            id: row.id,
            company_id: row.company_id,
            date: row.transaction_date,
            currency: row.currency.trim().to_string(),
            description: row.description,
            project_id: row.project_id,
            source,
            lines: lines
                .into_iter()
                .map(|l| TransactionLine {
                    id: l.id,
                    transaction_id: l.transaction_id,
                    account_id: l.account_id,
                    amount: l.amount,
                    memo: l.memo,
                })
                .collect(),
        }))
    }

    async fn query_cash_lines(&self, query: &CashLineQuery) -> StoreResult<Vec<CashLine>> {
        let order = query.order.as_sql();
        let sql = format!(
            "SELECT tl.id AS line_id, t.id AS transaction_id, t.transaction_date, t.currency, \
                    t.description, tl.memo, tl.amount, a.id AS account_id, \
                    a.code AS account_code, a.name AS account_name \
             FROM transaction_lines tl \
             JOIN transactions t ON t.id = tl.transaction_id \
             JOIN accounts a ON a.id = tl.account_id \
             WHERE t.company_id = $1 AND left(a.code, length($2)) = $2 \
             ORDER BY t.transaction_date {order}, t.created_at {order}, tl.line_no ASC \
             LIMIT $3",
            order = order
        );

        let rows = sqlx::query_as::<_, CashLineRow>(&sql)
            .bind(query.company_id)
            .bind(&query.account_code_prefix)
            .bind(query.limit as i64)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| CashLine {
                line_id: r.line_id,
                transaction_id: r.transaction_id,
                date: r.transaction_date,
                currency: r.currency.trim().to_string(),
                description: r.description,
                memo: r.memo,
                amount: r.amount,
                account_id: r.account_id,
                account_code: r.account_code,
                account_name: r.account_name,
            })
            .collect())
    }

    async fn account_balances(&self, company_id: Uuid) -> StoreResult<Vec<AccountBalance>> {
        sqlx::query_as::<_, AccountBalanceRow>(
            "SELECT a.id, a.company_id, a.code, a.name, a.account_type, \
                    COALESCE(SUM(tl.amount), 0) AS balance \
             FROM accounts a LEFT JOIN transaction_lines tl ON tl.account_id = a.id \
             WHERE a.company_id = $1 \
             GROUP BY a.id ORDER BY a.seq",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|row| {
            Ok(AccountBalance {
                account: Account::try_from(row.account)?,
                balance: row.balance,
            })
        })
        .collect()
    }

    async fn prefix_balance(&self, company_id: Uuid, code_prefix: &str, currency: &str) -> StoreResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(tl.amount), 0) \
             FROM transaction_lines tl \
             JOIN transactions t ON t.id = tl.transaction_id \
             JOIN accounts a ON a.id = tl.account_id \
             WHERE t.company_id = $1 AND left(a.code, length($2)) = $2 AND t.currency = $3",
        )
        .bind(company_id)
        .bind(code_prefix)
        .bind(currency)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)
    }

    async fn get_trust_account(&self, trust_account_id: Uuid) -> StoreResult<Option<TrustAccount>> {
        sqlx::query_as::<_, TrustAccountRow>(
            "SELECT id, client_id, project_id, currency, account_type, balance \
             FROM trust_accounts WHERE id = $1",
        )
        .bind(trust_account_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .map(TrustAccount::try_from)
        .transpose()
    }

    async fn find_trust_account(&self, key: &TrustAccountKey) -> StoreResult<Option<TrustAccount>> {
        sqlx::query_as::<_, TrustAccountRow>(
            "SELECT id, client_id, project_id, currency, account_type, balance \
             FROM trust_accounts WHERE project_id = $1 AND account_type = $2 AND currency = $3",
        )
        .bind(key.project_id)
        .bind(key.account_type.as_str())
        .bind(&key.currency)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .map(TrustAccount::try_from)
        .transpose()
    }

    async fn list_orphan_trust_accounts(&self) -> StoreResult<Vec<TrustAccount>> {
        sqlx::query_as::<_, TrustAccountRow>(
            "SELECT ta.id, ta.client_id, ta.project_id, ta.currency, ta.account_type, ta.balance \
             FROM trust_accounts ta \
             WHERE ta.project_id IS NULL \
                OR NOT EXISTS (SELECT 1 FROM projects p WHERE p.id = ta.project_id) \
             ORDER BY ta.created_at",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?
        .into_iter()
        .map(TrustAccount::try_from)
        .collect()
    }

    async fn list_trust_transactions(&self, trust_account_id: Uuid) -> StoreResult<Vec<TrustTransaction>> {
        let rows = sqlx::query_as::<_, TrustTransactionRow>(
            "SELECT id, trust_account_id, amount, transaction_date, memo \
             FROM trust_transactions WHERE trust_account_id = $1 ORDER BY created_at",
        )
        .bind(trust_account_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| TrustTransaction {
                id: r.id,
                trust_account_id: r.trust_account_id,
                amount: r.amount,
                date: r.transaction_date,
                memo: r.memo,
            })
            .collect())
    }

    async fn trust_balance_total(&self, company_id: Uuid, currency: &str) -> StoreResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(ta.balance), 0) FROM trust_accounts ta \
             JOIN clients c ON c.id = ta.client_id \
             WHERE c.company_id = $1 AND ta.currency = $2",
        )
        .bind(company_id)
        .bind(currency)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)
    }

    async fn get_client(&self, client_id: Uuid) -> StoreResult<Option<Client>> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, String)>(
            "SELECT id, company_id, name FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(|(id, company_id, name)| Client { id, company_id, name }))
    }

    async fn get_project(&self, project_id: Uuid) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, String)>(
            "SELECT id, client_id, name FROM projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(|(id, client_id, name)| Project { id, client_id, name }))
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> StoreResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, String, Decimal, String, NaiveDate)>(
            "SELECT id, project_id, number, amount, currency, issued_on FROM invoices WHERE id = $1",
        )
        .bind(invoice_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(|(id, project_id, number, amount, currency, issued_on)| Invoice {
            id,
            project_id,
            number,
            amount,
            currency: currency.trim().to_string(),
            issued_on,
        }))
    }

    async fn get_time_entry(&self, time_entry_id: Uuid) -> StoreResult<Option<TimeEntry>> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, Uuid, Decimal, Decimal, NaiveDate, String)>(
            "SELECT id, project_id, lawyer_id, hours, rate, worked_on, description \
             FROM time_entries WHERE id = $1",
        )
        .bind(time_entry_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(
            |(id, project_id, lawyer_id, hours, rate, worked_on, description)| TimeEntry {
                id,
                project_id,
                lawyer_id,
                hours,
                rate,
                worked_on,
                description,
            },
        ))
    }

    async fn list_assignments(&self, project_id: Uuid) -> StoreResult<Vec<ProjectAssignment>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String)>(
            "SELECT id, project_id, lawyer_id, position FROM project_assignments \
             WHERE project_id = $1 ORDER BY position, lawyer_id",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, project_id, lawyer_id, position)| ProjectAssignment {
                id,
                project_id,
                lawyer_id,
                position,
            })
            .collect())
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<Setting>> {
        let row = sqlx::query_as::<_, SettingRow>(
            "SELECT key, value, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(|r| Setting {
            key: r.key,
            value: r.value,
            updated_at: r.updated_at,
        }))
    }
}
