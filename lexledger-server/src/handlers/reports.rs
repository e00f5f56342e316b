use accounting_service::{IncomeSummary, TrialBalance};
use axum::extract::State;
use uuid::Uuid;

use crate::error::{api_success, ApiResult};
use crate::extract::AppPath;
use crate::server::LedgerServer;

pub async fn trial_balance(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
) -> ApiResult<TrialBalance> {
    let report = server.service.reports().trial_balance(company_id).await?;
    Ok(api_success(report))
}

pub async fn income_summary(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
) -> ApiResult<IncomeSummary> {
    let report = server.service.reports().income_summary(company_id).await?;
    Ok(api_success(report))
}
