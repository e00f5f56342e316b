use accounting_service::DeletionReport;
use axum::extract::State;
use uuid::Uuid;

use crate::error::{api_success, ApiResult};
use crate::extract::{AppPath, AppQuery};
use crate::handlers::ConfirmQuery;
use crate::server::LedgerServer;

/// Removes all of the company's books in one transaction
pub async fn wipe_company(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
    AppQuery(confirm): AppQuery<ConfirmQuery>,
) -> ApiResult<DeletionReport> {
    confirm.require("wipe-financials")?;
    let report = server
        .service
        .maintenance()
        .wipe_company_financials(company_id)
        .await?;
    Ok(api_success(report))
}

pub async fn delete_project(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(confirm): AppQuery<ConfirmQuery>,
) -> ApiResult<DeletionReport> {
    confirm.require("delete-project")?;
    let report = server.service.maintenance().delete_project(project_id).await?;
    Ok(api_success(report))
}
