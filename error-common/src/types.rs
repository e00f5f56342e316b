use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse error classification shared by all LexLedger crates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input was rejected before any write was attempted
    Validation,
    /// A referenced record does not exist
    NotFound,
    /// The request collides with existing state (duplicates, references)
    Conflict,
    /// The backing store failed (connection loss, timeout, commit failure)
    Storage,
    /// Anything else
    Internal,
}

impl ErrorCategory {
    /// HTTP status the presentation layer should answer with
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCategory::Validation => 422,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Storage => 503,
            ErrorCategory::Internal => 500,
        }
    }

    /// Process exit code used by operational tooling
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Validation => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Conflict => 4,
            ErrorCategory::Storage => 5,
            ErrorCategory::Internal => 1,
        }
    }

    /// Domain errors are safe to show verbatim; storage and internal ones are not
    pub fn is_client_visible(self) -> bool {
        !matches!(self, ErrorCategory::Storage | ErrorCategory::Internal)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Implemented by every error type that can cross a crate boundary
pub trait ErrorClassification: std::fmt::Debug {
    fn category(&self) -> ErrorCategory;

    /// Stable machine-readable code, see [`crate::codes`]
    fn code(&self) -> &'static str;
}

/// Log an error with its classification attached
pub fn log_error<E>(context: &str, error: &E)
where
    E: ErrorClassification + std::fmt::Display,
{
    match error.category() {
        ErrorCategory::Storage | ErrorCategory::Internal => tracing::error!(
            context = context,
            error_code = error.code(),
            category = %error.category(),
            error = %error,
            "LexLedger error occurred"
        ),
        _ => tracing::warn!(
            context = context,
            error_code = error.code(),
            category = %error.category(),
            error = %error,
            "Request rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_not_client_visible() {
        assert!(!ErrorCategory::Storage.is_client_visible());
        assert!(!ErrorCategory::Internal.is_client_visible());
        assert!(ErrorCategory::Validation.is_client_visible());
        assert!(ErrorCategory::Conflict.is_client_visible());
    }

    #[test]
    fn categories_map_to_distinct_statuses() {
        assert_eq!(ErrorCategory::Validation.http_status(), 422);
        assert_eq!(ErrorCategory::NotFound.http_status(), 404);
        assert_eq!(ErrorCategory::Conflict.http_status(), 409);
        assert_eq!(ErrorCategory::Storage.http_status(), 503);
    }
}
