use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers::{accounts, health, ledger, maintenance, practice, reports, settings, trust},
    server::LedgerServer,
};

/// Create health check routes
pub fn health_routes() -> Router<LedgerServer> {
    Router::new().route("/health", get(health::health_check))
}

/// Chart of accounts
pub fn account_routes() -> Router<LedgerServer> {
    Router::new()
        .route(
            "/companies/:company_id/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/companies/:company_id/chart-of-accounts/reset", post(accounts::reset_chart))
        .route("/companies/:company_id/expense-account", post(accounts::expense_account))
        .route("/accounts/:account_id", get(accounts::get_account).patch(accounts::update_account))
        .route("/accounts/:account_id/balance", get(accounts::account_balance))
}

/// General ledger postings and cash reports
pub fn ledger_routes() -> Router<LedgerServer> {
    Router::new()
        .route("/transactions", post(ledger::post_transaction))
        .route("/transactions/:transaction_id", get(ledger::get_transaction))
        .route("/companies/:company_id/cash-lines", get(ledger::cash_lines))
        .route(
            "/projects/:project_id/transactions",
            delete(ledger::delete_project_transactions),
        )
}

/// Trust subledger
pub fn trust_routes() -> Router<LedgerServer> {
    Router::new()
        .route("/trust-accounts", post(trust::open_trust_account))
        .route(
            "/trust-accounts/orphans",
            get(trust::find_orphans).delete(trust::purge_orphans),
        )
        .route("/trust-accounts/:trust_account_id", get(trust::get_trust_account))
        .route(
            "/trust-accounts/:trust_account_id/transactions",
            get(trust::list_trust_transactions).post(trust::post_trust_transaction),
        )
        .route("/companies/:company_id/trust-reconciliation", get(trust::reconcile))
}

/// Clients, projects and the records hanging off them
pub fn practice_routes() -> Router<LedgerServer> {
    Router::new()
        .route("/clients", post(practice::create_client))
        .route("/projects", post(practice::create_project))
        .route(
            "/projects/:project_id",
            get(practice::get_project).delete(maintenance::delete_project),
        )
        .route("/projects/:project_id/invoices", post(practice::record_invoice))
        .route("/projects/:project_id/time-entries", post(practice::record_time_entry))
        .route(
            "/projects/:project_id/lawyers",
            get(practice::list_lawyers).post(practice::assign_lawyer),
        )
}

pub fn maintenance_routes() -> Router<LedgerServer> {
    Router::new().route("/companies/:company_id/financials", delete(maintenance::wipe_company))
}

pub fn settings_routes() -> Router<LedgerServer> {
    Router::new().route(
        "/settings/exchange-rates/:base/:quote",
        put(settings::set_exchange_rate).get(settings::get_exchange_rate),
    )
}

pub fn report_routes() -> Router<LedgerServer> {
    Router::new()
        .route("/companies/:company_id/trial-balance", get(reports::trial_balance))
        .route("/companies/:company_id/income-summary", get(reports::income_summary))
}

/// API v1 routes
pub fn api_v1_routes() -> Router<LedgerServer> {
    Router::new()
        .merge(account_routes())
        .merge(ledger_routes())
        .merge(trust_routes())
        .merge(practice_routes())
        .merge(maintenance_routes())
        .merge(settings_routes())
        .merge(report_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<LedgerServer> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}
