use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AccountingError;

// =============================================================================
// Chart of Accounts
// =============================================================================

/// Account type in accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Income,
        AccountType::Expense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Income => "INCOME",
            AccountType::Expense => "EXPENSE",
        }
    }

    /// Assets and expenses carry debit (positive) balances
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = AccountingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASSET" => Ok(AccountType::Asset),
            "LIABILITY" => Ok(AccountType::Liability),
            "EQUITY" => Ok(AccountType::Equity),
            "INCOME" | "REVENUE" => Ok(AccountType::Income),
            "EXPENSE" => Ok(AccountType::Expense),
            other => Err(AccountingError::Validation(format!(
                "unknown account type '{}'",
                other
            ))),
        }
    }
}

/// Chart of Accounts - Account definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String, // e.g., "1000", "1020", "4000"
    pub name: String,
    pub account_type: AccountType,
}

/// Entry used to seed or reset a company's chart of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
}

impl ChartEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
        }
    }
}

// =============================================================================
// General Ledger
// =============================================================================

/// Business document a transaction was generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SourceDocument {
    Invoice(Uuid),
    TimeEntry(Uuid),
}

/// Double-entry transaction; line amounts are signed (debit positive, credit negative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub currency: String,
    pub description: String,
    pub project_id: Option<Uuid>,
    pub source: Option<SourceDocument>,
    pub lines: Vec<TransactionLine>,
}

impl Transaction {
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub memo: Option<String>,
}

/// Line of a transaction that has not been posted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLine {
    pub account_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub memo: Option<String>,
}

impl NewLine {
    pub fn new(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Posting request for the general ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub source: Option<SourceDocument>,
    pub lines: Vec<NewLine>,
}

/// Ledger line joined with its transaction and account, as used by cash reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashLine {
    pub line_id: Uuid,
    pub transaction_id: Uuid,
    pub date: NaiveDate,
    pub currency: String,
    pub description: String,
    pub memo: Option<String>,
    pub amount: Decimal,
    pub account_id: Uuid,
    pub account_code: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashLineQuery {
    pub company_id: Uuid,
    pub account_code_prefix: String,
    pub limit: usize,
    pub order: SortOrder,
}

/// Account with its signed ledger balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: Decimal,
}

// =============================================================================
// Trust Subledger
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrustAccountType {
    Retainer,
    Expense,
}

impl TrustAccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustAccountType::Retainer => "RETAINER",
            TrustAccountType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TrustAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustAccountType {
    type Err = AccountingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RETAINER" => Ok(TrustAccountType::Retainer),
            "EXPENSE" => Ok(TrustAccountType::Expense),
            other => Err(AccountingError::Validation(format!(
                "unknown trust account type '{}'",
                other
            ))),
        }
    }
}

/// Client funds held per project and currency. `project_id == None` marks an orphan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAccount {
    pub id: Uuid,
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    pub currency: String,
    pub account_type: TrustAccountType,
    pub balance: Decimal,
}

impl TrustAccount {
    pub fn key(&self) -> Option<TrustAccountKey> {
        self.project_id.map(|project_id| TrustAccountKey {
            project_id,
            account_type: self.account_type,
            currency: self.currency.clone(),
        })
    }
}

/// Uniqueness key of a live trust account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrustAccountKey {
    pub project_id: Uuid,
    pub account_type: TrustAccountType,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustTransaction {
    pub id: Uuid,
    pub trust_account_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub memo: String,
}

/// Result of posting to a trust account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPosting {
    pub entry: TrustTransaction,
    pub balance: Decimal,
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Practice records referenced by the ledger
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub project_id: Uuid,
    pub number: String,
    pub amount: Decimal,
    pub currency: String,
    pub issued_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub lawyer_id: Uuid,
    pub hours: Decimal,
    pub rate: Decimal,
    pub worked_on: NaiveDate,
    pub description: String,
}

/// Lawyer staffed on a project in a given position (partner, associate, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssignment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub lawyer_id: Uuid,
    pub position: String,
}
