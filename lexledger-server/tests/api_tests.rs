use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use config_engine::ServerConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use lexledger_server::{create_app, LedgerServer};

fn app() -> Router {
    create_app(LedgerServer::in_memory(), &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn account_id(accounts: &Value, code: &str) -> String {
    accounts["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["code"] == code)
        .map(|a| a["id"].as_str().unwrap().to_string())
        .unwrap()
}

async fn open_matter(app: &Router, company_id: Uuid) -> (String, String) {
    let (status, client) = send(
        app,
        "POST",
        "/api/v1/clients",
        Some(json!({ "company_id": company_id, "name": "Nile Holdings" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = client["data"]["id"].as_str().unwrap().to_string();

    let (status, project) = send(
        app,
        "POST",
        "/api/v1/projects",
        Some(json!({ "client_id": client_id, "name": "Share purchase" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["data"]["id"].as_str().unwrap().to_string();
    (client_id, project_id)
}

#[tokio::test]
async fn health_reports_in_memory_store() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "in-memory");
}

#[tokio::test]
async fn create_account_returns_created() {
    let app = app();
    let company_id = Uuid::new_v4();
    let uri = format!("/api/v1/companies/{}/accounts", company_id);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "code": "1000", "name": "Operating Cash", "account_type": "ASSET" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["code"], "1000");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "code": "1000", "name": "Petty Cash", "account_type": "ASSET" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "LEDGER_2001");

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = app();
    let uri = format!("/api/v1/accounts/{}", Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "LEDGER_2006");
    assert_eq!(body["error_type"], "not_found");
}

#[tokio::test]
async fn postings_must_balance() {
    let app = app();
    let company_id = Uuid::new_v4();

    let (status, chart) = send(
        &app,
        "POST",
        &format!("/api/v1/companies/{}/chart-of-accounts/reset?confirm=true", company_id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chart["data"].as_array().unwrap().len(), 5);
    let cash = account_id(&chart, "1000");
    let fees = account_id(&chart, "4000");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({
            "company_id": company_id,
            "date": "2024-03-01",
            "description": "Retainer fee",
            "lines": [
                { "account_id": cash, "amount": "100.00" },
                { "account_id": fees, "amount": "-40.00" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "LEDGER_2002");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({
            "company_id": company_id,
            "date": "2024-03-01",
            "description": "Retainer fee",
            "lines": [
                { "account_id": cash, "amount": "100.00" },
                { "account_id": fees, "amount": "-100.00" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["currency"], "USD");

    let (status, lines) = send(
        &app,
        "GET",
        &format!("/api/v1/companies/{}/cash-lines", company_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let lines = lines["data"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["account_code"], "1000");
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(json!({
            "company_id": Uuid::new_v4(),
            "date": "01/03/2024",
            "lines": []
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_1003");
}

#[tokio::test]
async fn zero_query_limit_is_rejected() {
    let app = app();
    let uri = format!("/api/v1/companies/{}/cash-lines?limit=0", Uuid::new_v4());
    let (status, _) = send(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn retainer_overdraw_is_rejected() {
    let app = app();
    let (client_id, project_id) = open_matter(&app, Uuid::new_v4()).await;

    let (status, account) = send(
        &app,
        "POST",
        "/api/v1/trust-accounts",
        Some(json!({
            "project_id": project_id,
            "client_id": client_id,
            "account_type": "RETAINER",
            "currency": "usd"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["data"]["currency"], "USD");
    let trust_id = account["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/trust-accounts/{}/transactions", trust_id);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "amount": "300", "date": "2024-03-02", "memo": "Deposit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["balance"], "300");

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "amount": "-500", "date": "2024-03-03", "memo": "Court fee" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "LEDGER_2003");

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleted_project_leaves_purgeable_orphans() {
    let app = app();
    let (client_id, project_id) = open_matter(&app, Uuid::new_v4()).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/trust-accounts",
        Some(json!({
            "project_id": project_id,
            "client_id": client_id,
            "account_type": "EXPENSE",
            "currency": "EGP"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/projects/{}?confirm=true", project_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, orphans) = send(&app, "GET", "/api/v1/trust-accounts/orphans", None).await;
    assert_eq!(status, StatusCode::OK);
    let orphans = orphans["data"].as_array().unwrap();
    assert_eq!(orphans.len(), 1);
    assert!(orphans[0]["project_id"].is_null());

    let (status, report) = send(&app, "DELETE", "/api/v1/trust-accounts/orphans?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["purged"].as_array().unwrap().len(), 1);
    assert!(report["data"]["failed"].as_array().unwrap().is_empty());

    let (_, orphans) = send(&app, "GET", "/api/v1/trust-accounts/orphans", None).await;
    assert!(orphans["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn exchange_rates_round_trip_through_settings() {
    let app = app();
    let uri = "/api/v1/settings/exchange-rates/egp/usd";

    let (status, body) = send(&app, "PUT", uri, Some(json!({ "rate": "50.75" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key"], "EX_RATE_EGP_USD");

    let (status, body) = send(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rate"], "50.75");

    let (status, body) = send(&app, "PUT", uri, Some(json!({ "rate": "abc" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "LEDGER_2004");

    let (status, _) = send(&app, "GET", "/api/v1/settings/exchange-rates/eur/usd", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_wipe_reports_removed_rows() {
    let app = app();
    let company_id = Uuid::new_v4();
    send(
        &app,
        "POST",
        &format!("/api/v1/companies/{}/chart-of-accounts/reset?confirm=true", company_id),
        Some(json!({})),
    )
    .await;

    let (status, report) = send(
        &app,
        "DELETE",
        &format!("/api/v1/companies/{}/financials?confirm=true", company_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accounts_removed: u64 = report["data"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["table"] == "accounts")
        .map(|s| s["rows"].as_u64().unwrap())
        .sum();
    assert_eq!(accounts_removed, 5);

    let (_, accounts) = send(&app, "GET", &format!("/api/v1/companies/{}/accounts", company_id), None).await;
    assert!(accounts["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn destructive_routes_require_confirmation() {
    let app = app();
    let company_id = Uuid::new_v4();
    let reset = format!("/api/v1/companies/{}/chart-of-accounts/reset", company_id);

    let (status, body) = send(&app, "POST", &reset, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_1002");

    let (status, _) = send(&app, "POST", &format!("{}?confirm=true", reset), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let wipe = format!("/api/v1/companies/{}/financials", company_id);
    for uri in [wipe.clone(), format!("{}?confirm=false", wipe)] {
        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "VALIDATION_1002");
    }
    let (_, accounts) = send(&app, "GET", &format!("/api/v1/companies/{}/accounts", company_id), None).await;
    assert_eq!(accounts["data"].as_array().unwrap().len(), 5);

    let (client_id, project_id) = open_matter(&app, company_id).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/trust-accounts",
        Some(json!({
            "project_id": project_id,
            "client_id": client_id,
            "account_type": "RETAINER",
            "currency": "USD"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/projects/{}", project_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send(&app, "GET", &format!("/api/v1/projects/{}", project_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/projects/{}/transactions", project_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    send(&app, "DELETE", &format!("/api/v1/projects/{}?confirm=true", project_id), None).await;
    let (status, _) = send(&app, "DELETE", "/api/v1/trust-accounts/orphans", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, orphans) = send(&app, "GET", "/api/v1/trust-accounts/orphans", None).await;
    assert_eq!(orphans["data"].as_array().unwrap().len(), 1);
}
