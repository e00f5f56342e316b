use error_common::{codes, ErrorCategory, ErrorClassification};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a [`crate::store::LedgerStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    #[error("Store timed out: {0}")]
    Timeout(String),

    #[error("Store unavailable: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl ErrorClassification for StoreError {
    fn category(&self) -> ErrorCategory {
        match self {
            StoreError::UniqueViolation(_)
            | StoreError::ForeignKeyViolation(_)
            | StoreError::CheckViolation(_) => ErrorCategory::Conflict,
            StoreError::Timeout(_) | StoreError::Backend(_) => ErrorCategory::Storage,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            StoreError::UniqueViolation(_)
            | StoreError::ForeignKeyViolation(_)
            | StoreError::CheckViolation(_) => codes::database::CONSTRAINT_VIOLATION,
            StoreError::Timeout(_) => codes::database::STATEMENT_TIMEOUT,
            StoreError::Backend(_) => codes::database::QUERY_FAILED,
        }
    }
}

#[derive(Error, Debug)]
pub enum AccountingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Account code '{code}' already exists for company {company_id}")]
    DuplicateCode { company_id: Uuid, code: String },

    #[error("Transaction does not balance: lines sum to {difference} {currency}")]
    UnbalancedTransaction { difference: Decimal, currency: String },

    #[error("Trust account {account_id} cannot go negative: balance {balance}, posting {amount}")]
    NegativeBalance {
        account_id: Uuid,
        balance: Decimal,
        amount: Decimal,
    },

    #[error("Invalid exchange rate '{input}': {reason}")]
    InvalidRate { input: String, reason: String },

    #[error("Referenced records prevent this change: {0}")]
    ForeignKeyViolation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Account {account_id} has posted lines; its type can no longer change")]
    AccountTypeLocked { account_id: Uuid },

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type AccountingResult<T> = Result<T, AccountingError>;

impl AccountingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AccountingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl ErrorClassification for AccountingError {
    fn category(&self) -> ErrorCategory {
        match self {
            AccountingError::Validation(_)
            | AccountingError::UnbalancedTransaction { .. }
            | AccountingError::NegativeBalance { .. }
            | AccountingError::InvalidRate { .. } => ErrorCategory::Validation,
            AccountingError::NotFound { .. } => ErrorCategory::NotFound,
            AccountingError::DuplicateCode { .. }
            | AccountingError::ForeignKeyViolation(_)
            | AccountingError::AccountTypeLocked { .. }
            | AccountingError::Conflict(_) => ErrorCategory::Conflict,
            AccountingError::Storage(inner) => inner.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AccountingError::Validation(_) => codes::validation::INVALID_INPUT,
            AccountingError::DuplicateCode { .. } => codes::ledger::DUPLICATE_CODE,
            AccountingError::UnbalancedTransaction { .. } => codes::ledger::UNBALANCED_TRANSACTION,
            AccountingError::NegativeBalance { .. } => codes::ledger::NEGATIVE_BALANCE,
            AccountingError::InvalidRate { .. } => codes::ledger::INVALID_RATE,
            AccountingError::ForeignKeyViolation(_) => codes::ledger::FOREIGN_KEY_VIOLATION,
            AccountingError::NotFound { .. } => codes::ledger::NOT_FOUND,
            AccountingError::AccountTypeLocked { .. } => codes::ledger::ACCOUNT_TYPE_LOCKED,
            AccountingError::Conflict(_) => codes::ledger::WRITE_CONFLICT,
            AccountingError::Storage(inner) => inner.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbalanced_is_a_validation_error() {
        let err = AccountingError::UnbalancedTransaction {
            difference: Decimal::new(1, 2),
            currency: "USD".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.code(), codes::ledger::UNBALANCED_TRANSACTION);
        assert!(err.to_string().contains("0.01 USD"));
    }

    #[test]
    fn storage_errors_keep_their_own_category() {
        let timeout = AccountingError::from(StoreError::Timeout("statement_timeout".into()));
        assert_eq!(timeout.category(), ErrorCategory::Storage);
        assert_eq!(timeout.code(), codes::database::STATEMENT_TIMEOUT);
    }
}
