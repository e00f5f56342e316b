use chrono::NaiveDate;
use logger_redacted::PiiRedactor;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult, StoreError};
use crate::models::*;
use crate::policy::{normalize_currency, LedgerPolicy};
use crate::store::{LedgerStore, LedgerTable, Mutation, TrustScope, WriteBatch};
use crate::validation::{check_storable, constraint_error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgedTrustAccount {
    pub trust_account_id: Uuid,
    pub client_id: Uuid,
    pub transactions_removed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeFailure {
    pub trust_account_id: Uuid,
    pub error: String,
}

/// Outcome of an orphan purge; each account is removed on its own
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub purged: Vec<PurgedTrustAccount>,
    pub failed: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn transactions_removed(&self) -> u64 {
        self.purged.iter().map(|p| p.transactions_removed).sum()
    }
}

/// Subledger total next to the general ledger's trust bank balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustReconciliation {
    pub company_id: Uuid,
    pub currency: String,
    pub subledger_total: Decimal,
    pub ledger_balance: Decimal,
    pub difference: Decimal,
    pub in_balance: bool,
}

/// Client trust funds held per project
pub struct TrustSubledger {
    store: Arc<dyn LedgerStore>,
    policy: Arc<LedgerPolicy>,
    redactor: PiiRedactor,
}

impl TrustSubledger {
    pub fn new(store: Arc<dyn LedgerStore>, policy: Arc<LedgerPolicy>, redactor: PiiRedactor) -> Self {
        Self {
            store,
            policy,
            redactor,
        }
    }

    /// The trust account for (project, type, currency), created with a zero
    /// balance when missing. Concurrent callers converge on one account.
    pub async fn get_or_create_trust_account(
        &self,
        project_id: Uuid,
        client_id: Uuid,
        account_type: TrustAccountType,
        currency: &str,
    ) -> AccountingResult<TrustAccount> {
        let currency = normalize_currency(currency)?;
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("project", project_id))?;
        if project.client_id != client_id {
            return Err(AccountingError::Validation(format!(
                "project {} does not belong to client {}",
                project_id, client_id
            )));
        }

        let key = TrustAccountKey {
            project_id,
            account_type,
            currency,
        };

        for attempt in 0..=self.policy.conflict_retries {
            if let Some(existing) = self.store.find_trust_account(&key).await? {
                return Ok(existing);
            }

            let account = TrustAccount {
                id: Uuid::new_v4(),
                client_id,
                project_id: Some(project_id),
                currency: key.currency.clone(),
                account_type,
                balance: Decimal::ZERO,
            };
            match self
                .store
                .apply(WriteBatch::new().with(Mutation::InsertTrustAccount(account.clone())))
                .await
            {
                Ok(_) => {
                    info!(
                        trust_account_id = %account.id,
                        project_id = %project_id,
                        account_type = %account_type,
                        currency = %account.currency,
                        "Trust account opened"
                    );
                    return Ok(account);
                }
                Err(StoreError::UniqueViolation(_)) => {
                    debug!(project_id = %project_id, attempt, "Trust account created concurrently, re-reading");
                }
                Err(e) => return Err(constraint_error(e)),
            }
        }

        Err(AccountingError::Conflict(format!(
            "trust account for project {} ({} {}) kept conflicting",
            project_id, account_type, key.currency
        )))
    }

    pub async fn get_trust_account(&self, trust_account_id: Uuid) -> AccountingResult<TrustAccount> {
        self.store
            .get_trust_account(trust_account_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("trust account", trust_account_id))
    }

    /// Deposit (positive) or withdrawal (negative). Balance and entry change together.
    pub async fn post_trust_transaction(
        &self,
        trust_account_id: Uuid,
        amount: Decimal,
        date: NaiveDate,
        memo: &str,
    ) -> AccountingResult<TrustPosting> {
        if amount.is_zero() {
            return Err(AccountingError::Validation(
                "trust transaction amount must not be zero".to_string(),
            ));
        }
        let account = self.get_trust_account(trust_account_id).await?;
        self.policy.check_precision(amount, &account.currency)?;
        check_storable("trust amount", amount)?;

        let floor = if self.policy.allows_negative(account.account_type) {
            None
        } else {
            Some(Decimal::ZERO)
        };
        let balance = account.balance.checked_add(amount).ok_or_else(|| {
            AccountingError::Validation(format!(
                "posting {} to trust account {} overflows its balance",
                amount, account.id
            ))
        })?;
        if floor.is_some_and(|f| balance < f) {
            return Err(AccountingError::NegativeBalance {
                account_id: account.id,
                balance: account.balance,
                amount,
            });
        }
        check_storable("trust balance", balance)?;

        let entry = TrustTransaction {
            id: Uuid::new_v4(),
            trust_account_id,
            amount,
            date,
            memo: memo.trim().to_string(),
        };
        let result = self
            .store
            .apply(WriteBatch::new().with(Mutation::PostTrustTransaction {
                entry: entry.clone(),
                floor,
            }))
            .await;

        match result {
            Ok(_) => {}
            // Another posting moved the balance between our read and write
            Err(StoreError::CheckViolation(_)) => {
                let current = self.get_trust_account(trust_account_id).await?;
                return Err(AccountingError::NegativeBalance {
                    account_id: trust_account_id,
                    balance: current.balance,
                    amount,
                });
            }
            Err(e) => return Err(constraint_error(e)),
        }

        let current = self.get_trust_account(trust_account_id).await?;
        info!(
            trust_account_id = %trust_account_id,
            amount = %amount,
            balance = %current.balance,
            memo = %self.redactor.redact(&entry.memo),
            "Trust transaction posted"
        );
        Ok(TrustPosting {
            entry,
            balance: current.balance,
        })
    }

    pub async fn list_trust_transactions(&self, trust_account_id: Uuid) -> AccountingResult<Vec<TrustTransaction>> {
        self.get_trust_account(trust_account_id).await?;
        Ok(self.store.list_trust_transactions(trust_account_id).await?)
    }

    /// Trust accounts whose project no longer exists
    pub async fn find_orphan_trust_accounts(&self) -> AccountingResult<Vec<TrustAccount>> {
        Ok(self.store.list_orphan_trust_accounts().await?)
    }

    /// Delete each orphan with its transactions. One failure does not stop the
    /// others; a second run finds nothing left to do.
    pub async fn purge_orphan_trust_accounts(&self) -> AccountingResult<PurgeReport> {
        let orphans = self.find_orphan_trust_accounts().await?;
        let mut report = PurgeReport::default();

        for orphan in orphans {
            let batch = WriteBatch::new()
                .with(Mutation::DeleteTrustTransactions(TrustScope::Account(orphan.id)))
                .with(Mutation::DeleteTrustAccounts(TrustScope::Account(orphan.id)));

            match self.store.apply(batch).await {
                Ok(outcome) => {
                    let transactions_removed = outcome.rows_for(LedgerTable::TrustTransactions);
                    info!(
                        trust_account_id = %orphan.id,
                        transactions_removed,
                        "Orphan trust account purged"
                    );
                    report.purged.push(PurgedTrustAccount {
                        trust_account_id: orphan.id,
                        client_id: orphan.client_id,
                        transactions_removed,
                    });
                }
                Err(e) => {
                    warn!(trust_account_id = %orphan.id, error = %e, "Failed to purge orphan trust account");
                    report.failed.push(PurgeFailure {
                        trust_account_id: orphan.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            purged = report.purged.len(),
            failed = report.failed.len(),
            "Orphan trust account purge finished"
        );
        Ok(report)
    }

    /// Compare the subledger with general ledger lines on the trust bank accounts
    pub async fn reconcile(&self, company_id: Uuid, currency: &str) -> AccountingResult<TrustReconciliation> {
        let currency = normalize_currency(currency)?;
        let subledger_total = self.store.trust_balance_total(company_id, &currency).await?;
        let ledger_balance = self
            .store
            .prefix_balance(company_id, &self.policy.trust_account_prefix, &currency)
            .await?;
        let difference = subledger_total - ledger_balance;
        let in_balance = self.policy.is_balanced(difference, &currency);

        if !in_balance {
            warn!(
                company_id = %company_id,
                currency = %currency,
                difference = %difference,
                "Trust subledger does not match the general ledger"
            );
        }

        Ok(TrustReconciliation {
            company_id,
            currency,
            subledger_total,
            ledger_balance,
            difference,
            in_balance,
        })
    }
}
