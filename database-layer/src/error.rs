use error_common::{codes, ErrorCategory, ErrorClassification};
use thiserror::Error;

// SQLSTATE codes the ledger reacts to
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const QUERY_CANCELED: &str = "57014";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    #[error("Statement timed out: {0}")]
    StatementTimeout(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DatabaseError::ForeignKeyViolation(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                let detail = match db.constraint() {
                    Some(constraint) => format!("{} ({})", db.message(), constraint),
                    None => db.message().to_string(),
                };
                match db.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => DatabaseError::UniqueViolation(detail),
                    Some(FOREIGN_KEY_VIOLATION) => DatabaseError::ForeignKeyViolation(detail),
                    Some(CHECK_VIOLATION) => DatabaseError::CheckViolation(detail),
                    Some(QUERY_CANCELED) => DatabaseError::StatementTimeout(detail),
                    _ => DatabaseError::QueryFailed(err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionFailed(err.to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationError(err.to_string())
    }
}

impl ErrorClassification for DatabaseError {
    fn category(&self) -> ErrorCategory {
        match self {
            DatabaseError::UniqueViolation(_)
            | DatabaseError::ForeignKeyViolation(_)
            | DatabaseError::CheckViolation(_) => ErrorCategory::Conflict,
            DatabaseError::ConnectionFailed(_)
            | DatabaseError::QueryFailed(_)
            | DatabaseError::StatementTimeout(_) => ErrorCategory::Storage,
            DatabaseError::MigrationError(_) => ErrorCategory::Internal,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => codes::database::CONNECTION_FAILED,
            DatabaseError::QueryFailed(_) => codes::database::QUERY_FAILED,
            DatabaseError::UniqueViolation(_)
            | DatabaseError::ForeignKeyViolation(_)
            | DatabaseError::CheckViolation(_) => codes::database::CONSTRAINT_VIOLATION,
            DatabaseError::StatementTimeout(_) => codes::database::STATEMENT_TIMEOUT,
            DatabaseError::MigrationError(_) => codes::database::MIGRATION_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_a_connection_failure() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::ConnectionFailed(_)));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn row_not_found_is_a_query_failure() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), codes::database::QUERY_FAILED);
    }

    #[test]
    fn constraint_violations_are_conflicts() {
        let err = DatabaseError::UniqueViolation("accounts_company_code_key".into());
        assert!(err.is_unique_violation());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }
}
