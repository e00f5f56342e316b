use accounting_service::{
    PurgeReport, TrustAccount, TrustAccountType, TrustPosting, TrustReconciliation, TrustTransaction,
};
use axum::extract::State;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{api_created, api_success, ApiCreated, ApiResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::ConfirmQuery;
use crate::server::LedgerServer;

#[derive(Debug, Deserialize)]
pub struct OpenTrustAccountRequest {
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub account_type: TrustAccountType,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct TrustTransactionRequest {
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileQuery {
    pub currency: Option<String>,
}

/// Existing account for (project, type, currency) or a new one
pub async fn open_trust_account(
    State(server): State<LedgerServer>,
    AppJson(request): AppJson<OpenTrustAccountRequest>,
) -> ApiResult<TrustAccount> {
    let account = server
        .service
        .trust()
        .get_or_create_trust_account(
            request.project_id,
            request.client_id,
            request.account_type,
            &request.currency,
        )
        .await?;
    Ok(api_success(account))
}

pub async fn get_trust_account(
    State(server): State<LedgerServer>,
    AppPath(trust_account_id): AppPath<Uuid>,
) -> ApiResult<TrustAccount> {
    let account = server.service.trust().get_trust_account(trust_account_id).await?;
    Ok(api_success(account))
}

pub async fn post_trust_transaction(
    State(server): State<LedgerServer>,
    AppPath(trust_account_id): AppPath<Uuid>,
    AppJson(request): AppJson<TrustTransactionRequest>,
) -> ApiCreated<TrustPosting> {
    let posting = server
        .service
        .trust()
        .post_trust_transaction(trust_account_id, request.amount, request.date, &request.memo)
        .await?;
    Ok(api_created(posting))
}

pub async fn list_trust_transactions(
    State(server): State<LedgerServer>,
    AppPath(trust_account_id): AppPath<Uuid>,
) -> ApiResult<Vec<TrustTransaction>> {
    let entries = server
        .service
        .trust()
        .list_trust_transactions(trust_account_id)
        .await?;
    Ok(api_success(entries))
}

pub async fn find_orphans(State(server): State<LedgerServer>) -> ApiResult<Vec<TrustAccount>> {
    let orphans = server.service.trust().find_orphan_trust_accounts().await?;
    Ok(api_success(orphans))
}

pub async fn purge_orphans(
    State(server): State<LedgerServer>,
    AppQuery(confirm): AppQuery<ConfirmQuery>,
) -> ApiResult<PurgeReport> {
    confirm.require("purge-orphans")?;
    let report = server.service.trust().purge_orphan_trust_accounts().await?;
    Ok(api_success(report))
}

pub async fn reconcile(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ReconcileQuery>,
) -> ApiResult<TrustReconciliation> {
    let currency = query
        .currency
        .unwrap_or_else(|| server.service.policy().default_currency.clone());
    let result = server.service.trust().reconcile(company_id, &currency).await?;
    Ok(api_success(result))
}
