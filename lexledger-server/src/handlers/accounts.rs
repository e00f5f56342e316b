use accounting_service::{standard_chart, Account, AccountType, AccountUpdate, ChartEntry};
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{api_created, api_success, ApiCreated, ApiResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::ConfirmQuery;
use crate::server::LedgerServer;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
}

/// Body of a chart reset; omitted entries mean the standard chart
#[derive(Debug, Default, Deserialize)]
pub struct ResetChartRequest {
    #[serde(default)]
    pub entries: Option<Vec<ChartEntry>>,
}

#[derive(Debug, Serialize)]
pub struct AccountBalanceResponse {
    pub account_id: Uuid,
    pub balance: Decimal,
}

pub async fn create_account(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
    AppJson(request): AppJson<CreateAccountRequest>,
) -> ApiCreated<Account> {
    let account = server
        .service
        .accounts()
        .create_account(company_id, &request.code, &request.name, request.account_type)
        .await?;
    Ok(api_created(account))
}

pub async fn list_accounts(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
) -> ApiResult<Vec<Account>> {
    let accounts = server.service.accounts().list_accounts(company_id).await?;
    Ok(api_success(accounts))
}

pub async fn get_account(
    State(server): State<LedgerServer>,
    AppPath(account_id): AppPath<Uuid>,
) -> ApiResult<Account> {
    let account = server.service.accounts().get_account(account_id).await?;
    Ok(api_success(account))
}

pub async fn update_account(
    State(server): State<LedgerServer>,
    AppPath(account_id): AppPath<Uuid>,
    AppJson(update): AppJson<AccountUpdate>,
) -> ApiResult<Account> {
    let account = server.service.accounts().update_account(account_id, update).await?;
    Ok(api_success(account))
}

pub async fn account_balance(
    State(server): State<LedgerServer>,
    AppPath(account_id): AppPath<Uuid>,
) -> ApiResult<AccountBalanceResponse> {
    let balance = server.service.ledger().account_balance(account_id).await?;
    Ok(api_success(AccountBalanceResponse { account_id, balance }))
}

pub async fn reset_chart(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
    AppQuery(confirm): AppQuery<ConfirmQuery>,
    AppJson(request): AppJson<ResetChartRequest>,
) -> ApiResult<Vec<Account>> {
    confirm.require("reset-coa")?;
    let entries = request.entries.unwrap_or_else(standard_chart);
    let accounts = server
        .service
        .accounts()
        .reset_chart_of_accounts(company_id, entries)
        .await?;
    Ok(api_success(accounts))
}

pub async fn expense_account(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
) -> ApiResult<Account> {
    let account = server
        .service
        .accounts()
        .get_or_create_expense_account(company_id)
        .await?;
    Ok(api_success(account))
}
