use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AccountingResult;
use crate::models::{AccountType, AccountBalance};
use crate::store::LedgerStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub debit: Decimal,
    pub credit: Decimal,
    /// False when the balance sits on the side opposite the account type's
    /// normal side, e.g. an overdrawn cash account
    pub normal_side: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    pub company_id: Uuid,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
}

impl TrialBalance {
    pub fn is_balanced(&self) -> bool {
        self.total_debits == self.total_credits
    }

    /// Accounts carrying a balance on the wrong side for their type
    pub fn abnormal_rows(&self) -> impl Iterator<Item = &TrialBalanceRow> {
        self.rows.iter().filter(|r| !r.normal_side)
    }
}

/// Income minus expenses over all posted lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeSummary {
    pub company_id: Uuid,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_income: Decimal,
}

/// Accounting reports service
pub struct AccountingReports {
    store: Arc<dyn LedgerStore>,
}

impl AccountingReports {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// One row per account, positive balances in the debit column
    pub async fn trial_balance(&self, company_id: Uuid) -> AccountingResult<TrialBalance> {
        let balances = self.store.account_balances(company_id).await?;
        let rows: Vec<TrialBalanceRow> = balances.into_iter().map(row).collect();
        let total_debits = rows.iter().map(|r| r.debit).sum();
        let total_credits = rows.iter().map(|r| r.credit).sum();

        Ok(TrialBalance {
            company_id,
            rows,
            total_debits,
            total_credits,
        })
    }

    pub async fn income_summary(&self, company_id: Uuid) -> AccountingResult<IncomeSummary> {
        let balances = self.store.account_balances(company_id).await?;
        // Income carries credit (negative) balances
        let income: Decimal = -balances
            .iter()
            .filter(|b| b.account.account_type == AccountType::Income)
            .map(|b| b.balance)
            .sum::<Decimal>();
        let expenses: Decimal = balances
            .iter()
            .filter(|b| b.account.account_type == AccountType::Expense)
            .map(|b| b.balance)
            .sum();

        Ok(IncomeSummary {
            company_id,
            income,
            expenses,
            net_income: income - expenses,
        })
    }
}

fn row(balance: AccountBalance) -> TrialBalanceRow {
    let (debit, credit) = if balance.balance >= Decimal::ZERO {
        (balance.balance, Decimal::ZERO)
    } else {
        (Decimal::ZERO, -balance.balance)
    };
    let normal_side = if balance.account.account_type.is_debit_normal() {
        balance.balance >= Decimal::ZERO
    } else {
        balance.balance <= Decimal::ZERO
    };
    TrialBalanceRow {
        account_id: balance.account.id,
        code: balance.account.code,
        name: balance.account.name,
        account_type: balance.account.account_type,
        debit,
        credit,
        normal_side,
    }
}
