use accounting_service::{exchange_rate_key, AccountingError};
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{api_success, ApiResult};
use crate::extract::{AppJson, AppPath};
use crate::server::LedgerServer;

/// Rate as a decimal string, e.g. `"50.75"`
#[derive(Debug, Deserialize)]
pub struct SetRateRequest {
    pub rate: String,
}

#[derive(Debug, Serialize)]
pub struct ExchangeRateResponse {
    pub key: String,
    pub rate: Decimal,
}

pub async fn set_exchange_rate(
    State(server): State<LedgerServer>,
    AppPath((base, quote)): AppPath<(String, String)>,
    AppJson(request): AppJson<SetRateRequest>,
) -> ApiResult<ExchangeRateResponse> {
    let key = exchange_rate_key(&base, &quote)?;
    let rate = server
        .service
        .settings()
        .set_exchange_rate(&key, &request.rate)
        .await?;
    Ok(api_success(ExchangeRateResponse { key, rate }))
}

pub async fn get_exchange_rate(
    State(server): State<LedgerServer>,
    AppPath((base, quote)): AppPath<(String, String)>,
) -> ApiResult<ExchangeRateResponse> {
    let key = exchange_rate_key(&base, &quote)?;
    let rate = server
        .service
        .settings()
        .get_exchange_rate(&key)
        .await?
        .ok_or_else(|| AccountingError::not_found("exchange rate", &key))?;
    Ok(api_success(ExchangeRateResponse { key, rate }))
}
