use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult, StoreError};
use crate::models::{Account, AccountType, ChartEntry};
use crate::policy::LedgerPolicy;
use crate::store::{LedgerStore, Mutation, WriteBatch};
use crate::validation::{constraint_error, required};

/// Default chart seeded for new companies, one account per type
pub fn standard_chart() -> Vec<ChartEntry> {
    vec![
        ChartEntry::new("1000", "Operating Cash", AccountType::Asset),
        ChartEntry::new("2000", "Client Trust Liability", AccountType::Liability),
        ChartEntry::new("3000", "Partners' Equity", AccountType::Equity),
        ChartEntry::new("4000", "Legal Fees", AccountType::Income),
        ChartEntry::new("5000", "Operating Expenses", AccountType::Expense),
    ]
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
}

/// Chart of accounts per company
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
    policy: Arc<LedgerPolicy>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>, policy: Arc<LedgerPolicy>) -> Self {
        Self { store, policy }
    }

    pub async fn create_account(
        &self,
        company_id: Uuid,
        code: &str,
        name: &str,
        account_type: AccountType,
    ) -> AccountingResult<Account> {
        let code = required("account code", code)?;
        let name = required("account name", name)?;

        if self.store.find_account_by_code(company_id, &code).await?.is_some() {
            return Err(AccountingError::DuplicateCode { company_id, code });
        }

        let account = Account {
            id: Uuid::new_v4(),
            company_id,
            code,
            name,
            account_type,
        };
        self.store
            .apply(WriteBatch::new().with(Mutation::InsertAccount(account.clone())))
            .await
            .map_err(|e| duplicate_or(e, company_id, &account.code))?;

        info!(
            company_id = %company_id,
            account_id = %account.id,
            code = %account.code,
            account_type = %account.account_type,
            "Account created"
        );
        Ok(account)
    }

    pub async fn get_account(&self, account_id: Uuid) -> AccountingResult<Account> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("account", account_id))
    }

    pub async fn find_account_by_code(&self, company_id: Uuid, code: &str) -> AccountingResult<Option<Account>> {
        Ok(self.store.find_account_by_code(company_id, code.trim()).await?)
    }

    /// Accounts in the order they were created
    pub async fn list_accounts(&self, company_id: Uuid) -> AccountingResult<Vec<Account>> {
        Ok(self.store.list_accounts(company_id).await?)
    }

    /// Renames are always allowed; the type is fixed once lines reference the account
    pub async fn update_account(&self, account_id: Uuid, update: AccountUpdate) -> AccountingResult<Account> {
        let current = self.get_account(account_id).await?;
        let mut updated = current.clone();

        if let Some(code) = update.code.as_deref() {
            updated.code = required("account code", code)?;
            if updated.code != current.code {
                if let Some(existing) = self.store.find_account_by_code(current.company_id, &updated.code).await? {
                    if existing.id != account_id {
                        return Err(AccountingError::DuplicateCode {
                            company_id: current.company_id,
                            code: updated.code,
                        });
                    }
                }
            }
        }
        if let Some(name) = update.name.as_deref() {
            updated.name = required("account name", name)?;
        }
        if let Some(account_type) = update.account_type {
            if account_type != current.account_type {
                let referenced = self.store.referenced_account_ids(current.company_id).await?;
                if referenced.contains(&account_id) {
                    return Err(AccountingError::AccountTypeLocked { account_id });
                }
            }
            updated.account_type = account_type;
        }

        if updated == current {
            return Ok(current);
        }

        self.store
            .apply(WriteBatch::new().with(Mutation::UpdateAccount(updated.clone())))
            .await
            .map_err(|e| duplicate_or(e, updated.company_id, &updated.code))?;

        info!(account_id = %account_id, code = %updated.code, "Account updated");
        Ok(updated)
    }

    /// Replace the company's chart in one atomic step. Fails without changes
    /// while any of the company's accounts is referenced by a transaction line.
    pub async fn reset_chart_of_accounts(
        &self,
        company_id: Uuid,
        entries: Vec<ChartEntry>,
    ) -> AccountingResult<Vec<Account>> {
        if entries.is_empty() {
            return Err(AccountingError::Validation(
                "a chart of accounts needs at least one entry".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut accounts = Vec::with_capacity(entries.len());
        for entry in entries {
            let code = required("account code", &entry.code)?;
            let name = required("account name", &entry.name)?;
            if !seen.insert(code.clone()) {
                return Err(AccountingError::DuplicateCode { company_id, code });
            }
            accounts.push(Account {
                id: Uuid::new_v4(),
                company_id,
                code,
                name,
                account_type: entry.account_type,
            });
        }

        let referenced = self.store.referenced_account_ids(company_id).await?;
        if !referenced.is_empty() {
            return Err(AccountingError::ForeignKeyViolation(format!(
                "{} account(s) of company {} are referenced by posted transactions",
                referenced.len(),
                company_id
            )));
        }

        let mut batch = WriteBatch::new().with(Mutation::DeleteAccounts { company_id });
        for account in &accounts {
            batch.push(Mutation::InsertAccount(account.clone()));
        }
        let outcome = self.store.apply(batch).await.map_err(constraint_error)?;

        info!(
            company_id = %company_id,
            removed = outcome.steps.first().map_or(0, |s| s.rows),
            seeded = accounts.len(),
            "Chart of accounts reset"
        );
        Ok(accounts)
    }

    /// Existing account with the entry's code, or a new one. Concurrent callers
    /// converge on a single row.
    pub async fn get_or_create_account(&self, company_id: Uuid, entry: &ChartEntry) -> AccountingResult<Account> {
        let code = required("account code", &entry.code)?;
        let name = required("account name", &entry.name)?;

        for attempt in 0..=self.policy.conflict_retries {
            if let Some(existing) = self.store.find_account_by_code(company_id, &code).await? {
                return Ok(existing);
            }

            let account = Account {
                id: Uuid::new_v4(),
                company_id,
                code: code.clone(),
                name: name.clone(),
                account_type: entry.account_type,
            };
            match self
                .store
                .apply(WriteBatch::new().with(Mutation::InsertAccount(account.clone())))
                .await
            {
                Ok(_) => {
                    info!(company_id = %company_id, code = %code, "Account created on demand");
                    return Ok(account);
                }
                Err(StoreError::UniqueViolation(_)) => {
                    debug!(company_id = %company_id, code = %code, attempt, "Lost account creation race, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AccountingError::Conflict(format!(
            "account {} for company {} kept conflicting",
            code, company_id
        )))
    }

    /// The company's expense account, created with the configured code when missing
    pub async fn get_or_create_expense_account(&self, company_id: Uuid) -> AccountingResult<Account> {
        let entry = ChartEntry::new(
            self.policy.expense_account_code.clone(),
            "Operating Expenses",
            AccountType::Expense,
        );
        let account = self.get_or_create_account(company_id, &entry).await?;
        if account.account_type != AccountType::Expense {
            return Err(AccountingError::Validation(format!(
                "account {} exists but is {}, not EXPENSE",
                account.code, account.account_type
            )));
        }
        Ok(account)
    }
}

fn duplicate_or(err: StoreError, company_id: Uuid, code: &str) -> AccountingError {
    match err {
        StoreError::UniqueViolation(_) => AccountingError::DuplicateCode {
            company_id,
            code: code.to_string(),
        },
        other => constraint_error(other),
    }
}
