use accounting_service::{CashLine, NewLine, NewTransaction, RemovedTransactions, SortOrder, SourceDocument, Transaction};
use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{api_created, api_success, ApiCreated, ApiResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::ConfirmQuery;
use crate::server::LedgerServer;

/// Posting request; currency falls back to the ledger's default
#[derive(Debug, Deserialize)]
pub struct PostTransactionRequest {
    pub company_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub source: Option<SourceDocument>,
    pub lines: Vec<NewLine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CashLinesQuery {
    /// Account code prefix, the configured cash prefix when omitted
    pub prefix: Option<String>,
    pub limit: Option<usize>,
    pub order: Option<SortOrder>,
}

pub async fn post_transaction(
    State(server): State<LedgerServer>,
    AppJson(request): AppJson<PostTransactionRequest>,
) -> ApiCreated<Transaction> {
    let currency = request
        .currency
        .unwrap_or_else(|| server.service.policy().default_currency.clone());
    let transaction = server
        .service
        .ledger()
        .post(NewTransaction {
            company_id: request.company_id,
            date: request.date,
            currency,
            description: request.description,
            project_id: request.project_id,
            source: request.source,
            lines: request.lines,
        })
        .await?;
    Ok(api_created(transaction))
}

pub async fn get_transaction(
    State(server): State<LedgerServer>,
    AppPath(transaction_id): AppPath<Uuid>,
) -> ApiResult<Transaction> {
    let transaction = server.service.ledger().get_transaction(transaction_id).await?;
    Ok(api_success(transaction))
}

pub async fn cash_lines(
    State(server): State<LedgerServer>,
    AppPath(company_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<CashLinesQuery>,
) -> ApiResult<Vec<CashLine>> {
    let policy = server.service.policy();
    let prefix = query.prefix.unwrap_or_else(|| policy.cash_account_prefix.clone());
    let lines = server
        .service
        .ledger()
        .query_cash_lines(
            company_id,
            &prefix,
            query.limit.unwrap_or(policy.default_query_limit),
            query.order.unwrap_or_default(),
        )
        .await?;
    Ok(api_success(lines))
}

pub async fn delete_project_transactions(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(confirm): AppQuery<ConfirmQuery>,
) -> ApiResult<RemovedTransactions> {
    confirm.require("delete-project-transactions")?;
    let removed = server
        .service
        .ledger()
        .delete_transactions_for_project(project_id)
        .await?;
    Ok(api_success(removed))
}
