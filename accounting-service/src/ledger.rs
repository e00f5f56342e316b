use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult};
use crate::models::*;
use crate::policy::{normalize_currency, LedgerPolicy};
use crate::store::{LedgerStore, LedgerTable, Mutation, Scope, WriteBatch};
use crate::validation::{check_storable, checked_total, constraint_error};

/// Rows removed by a project-scoped ledger cleanup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovedTransactions {
    pub transactions: u64,
    pub lines: u64,
}

/// General Ledger service
pub struct GeneralLedger {
    store: Arc<dyn LedgerStore>,
    policy: Arc<LedgerPolicy>,
}

impl GeneralLedger {
    pub fn new(store: Arc<dyn LedgerStore>, policy: Arc<LedgerPolicy>) -> Self {
        Self { store, policy }
    }

    /// Post lines in the default currency
    pub async fn post_transaction(
        &self,
        company_id: Uuid,
        date: NaiveDate,
        lines: Vec<NewLine>,
    ) -> AccountingResult<Transaction> {
        self.post(NewTransaction {
            company_id,
            date,
            currency: self.policy.default_currency.clone(),
            description: String::new(),
            project_id: None,
            source: None,
            lines,
        })
        .await
    }

    /// Validate and record a double-entry transaction. Header and lines are
    /// written together or not at all.
    pub async fn post(&self, request: NewTransaction) -> AccountingResult<Transaction> {
        let currency = normalize_currency(&request.currency)?;

        if request.lines.len() < 2 {
            return Err(AccountingError::Validation(
                "a transaction needs at least two lines".to_string(),
            ));
        }
        for line in &request.lines {
            if line.amount.is_zero() {
                return Err(AccountingError::Validation(format!(
                    "line for account {} has a zero amount",
                    line.account_id
                )));
            }
            self.policy.check_precision(line.amount, &currency)?;
            check_storable("line amount", line.amount)?;
        }

        let total = checked_total(request.lines.iter().map(|l| l.amount))?;
        if !self.policy.is_balanced(total, &currency) {
            return Err(AccountingError::UnbalancedTransaction {
                difference: total,
                currency,
            });
        }

        let mut accounts: HashMap<Uuid, Account> = HashMap::new();
        for line in &request.lines {
            if accounts.contains_key(&line.account_id) {
                continue;
            }
            let account = self
                .store
                .get_account(line.account_id)
                .await?
                .ok_or_else(|| AccountingError::not_found("account", line.account_id))?;
            if account.company_id != request.company_id {
                return Err(AccountingError::Validation(format!(
                    "account {} belongs to another company",
                    account.code
                )));
            }
            accounts.insert(account.id, account);
        }

        let project_id = self.resolve_project(&request).await?;

        let transaction_id = Uuid::new_v4();
        let transaction = Transaction {
            id: transaction_id,
            company_id: request.company_id,
            date: request.date,
            currency,
            description: request.description.trim().to_string(),
            project_id,
            source: request.source,
            lines: request
                .lines
                .into_iter()
                .map(|l| TransactionLine {
                    id: Uuid::new_v4(),
                    transaction_id,
                    account_id: l.account_id,
                    amount: l.amount,
                    memo: l.memo,
                })
                .collect(),
        };

        self.store
            .apply(WriteBatch::new().with(Mutation::InsertTransaction(transaction.clone())))
            .await
            .map_err(constraint_error)?;

        info!(
            company_id = %transaction.company_id,
            transaction_id = %transaction.id,
            lines = transaction.lines.len(),
            currency = %transaction.currency,
            "Transaction posted"
        );
        Ok(transaction)
    }

    /// Project tag from the request, cross-checked against the source document
    async fn resolve_project(&self, request: &NewTransaction) -> AccountingResult<Option<Uuid>> {
        let source_project = match request.source {
            Some(SourceDocument::Invoice(id)) => Some(
                self.store
                    .get_invoice(id)
                    .await?
                    .ok_or_else(|| AccountingError::not_found("invoice", id))?
                    .project_id,
            ),
            Some(SourceDocument::TimeEntry(id)) => Some(
                self.store
                    .get_time_entry(id)
                    .await?
                    .ok_or_else(|| AccountingError::not_found("time entry", id))?
                    .project_id,
            ),
            None => None,
        };

        let project_id = match (request.project_id, source_project) {
            (Some(tagged), Some(source)) if tagged != source => {
                return Err(AccountingError::Validation(format!(
                    "source document belongs to project {}, not {}",
                    source, tagged
                )));
            }
            (tagged, source) => tagged.or(source),
        };
        let Some(project_id) = project_id else {
            return Ok(None);
        };

        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("project", project_id))?;
        let client = self
            .store
            .get_client(project.client_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("client", project.client_id))?;
        if client.company_id != request.company_id {
            return Err(AccountingError::Validation(format!(
                "project {} belongs to another company",
                project_id
            )));
        }
        Ok(Some(project_id))
    }

    pub async fn get_transaction(&self, transaction_id: Uuid) -> AccountingResult<Transaction> {
        self.store
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("transaction", transaction_id))
    }

    /// Lines on accounts whose code starts with `account_code_prefix`, most recent first by default
    pub async fn query_cash_lines(
        &self,
        company_id: Uuid,
        account_code_prefix: &str,
        limit: usize,
        order: SortOrder,
    ) -> AccountingResult<Vec<CashLine>> {
        if limit == 0 {
            return Err(AccountingError::Validation("limit must be positive".to_string()));
        }
        let query = CashLineQuery {
            company_id,
            account_code_prefix: account_code_prefix.trim().to_string(),
            limit: limit.min(self.policy.max_query_limit),
            order,
        };
        Ok(self.store.query_cash_lines(&query).await?)
    }

    /// Signed sum of every line posted to the account
    pub async fn account_balance(&self, account_id: Uuid) -> AccountingResult<Decimal> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("account", account_id))?;
        let balances = self.store.account_balances(account.company_id).await?;
        Ok(balances
            .into_iter()
            .find(|b| b.account.id == account_id)
            .map_or(Decimal::ZERO, |b| b.balance))
    }

    /// Remove every transaction tied to the project, directly or through its
    /// invoices and time entries. Safe to repeat.
    pub async fn delete_transactions_for_project(&self, project_id: Uuid) -> AccountingResult<RemovedTransactions> {
        let batch = WriteBatch::new()
            .with(Mutation::DeleteTransactionLines(Scope::Project(project_id)))
            .with(Mutation::DeleteTransactions(Scope::Project(project_id)));
        let outcome = self.store.apply(batch).await.map_err(constraint_error)?;

        let removed = RemovedTransactions {
            transactions: outcome.rows_for(LedgerTable::Transactions),
            lines: outcome.rows_for(LedgerTable::TransactionLines),
        };
        info!(
            project_id = %project_id,
            transactions = removed.transactions,
            lines = removed.lines,
            "Project transactions removed"
        );
        Ok(removed)
    }
}
