use accounting_service::AccountingError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{codes, ErrorCategory, ErrorClassification};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Stable machine-readable code, e.g. `LEDGER_2002`
    pub error_code: String,
    /// Coarse category: validation, not_found, conflict, storage, internal
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("'{action}' deletes data; repeat the request with ?confirm=true")]
    ConfirmationRequired { action: &'static str },

    #[error(transparent)]
    Accounting(#[from] AccountingError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.category().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Storage and internal failures are logged in full but answered generically
    fn public_message(&self) -> String {
        if self.category().is_client_visible() {
            self.to_string()
        } else {
            "The ledger store is temporarily unavailable. Please retry.".to_string()
        }
    }
}

impl ErrorClassification for ApiError {
    fn category(&self) -> ErrorCategory {
        match self {
            ApiError::BadRequest { .. } | ApiError::ConfirmationRequired { .. } => {
                ErrorCategory::Validation
            }
            ApiError::Accounting(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => codes::validation::INVALID_FORMAT,
            ApiError::ConfirmationRequired { .. } => codes::validation::MISSING_REQUIRED_FIELD,
            ApiError::Accounting(e) => e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let body = ApiErrorResponse {
            error_id,
            error_code: self.code().to_string(),
            error_type: self.category().to_string(),
            message: self.public_message(),
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { success: true, data })
}

/// 201 with the created resource
pub fn api_created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, api_success(data))
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use accounting_service::StoreError;

    #[test]
    fn categories_map_to_statuses() {
        let cases = [
            (ApiError::bad_request("bad date"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AccountingError::not_found("account", Uuid::nil()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                AccountingError::Conflict("raced".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                AccountingError::Storage(StoreError::Timeout("slow".into())).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{}", error);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let error: ApiError = AccountingError::Storage(StoreError::Backend("password=hunter2".into())).into();
        assert!(!error.public_message().contains("hunter2"));

        let visible: ApiError = AccountingError::Validation("limit must be positive".into()).into();
        assert!(visible.public_message().contains("limit must be positive"));
    }
}
