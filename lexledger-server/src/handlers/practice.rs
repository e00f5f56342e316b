use accounting_service::{Client, Invoice, Project, ProjectAssignment, TimeEntry};
use axum::extract::State;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{api_created, api_success, ApiCreated, ApiResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::server::LedgerServer;

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub company_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub client_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordInvoiceRequest {
    pub number: String,
    pub amount: Decimal,
    pub currency: String,
    pub issued_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct RecordTimeEntryRequest {
    pub lawyer_id: Uuid,
    pub hours: Decimal,
    pub rate: Decimal,
    pub worked_on: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignLawyerRequest {
    pub lawyer_id: Uuid,
    pub position: String,
}

#[derive(Debug, Deserialize)]
pub struct LawyersQuery {
    pub position: Option<String>,
}

pub async fn create_client(
    State(server): State<LedgerServer>,
    AppJson(request): AppJson<CreateClientRequest>,
) -> ApiCreated<Client> {
    let client = server
        .service
        .practice()
        .create_client(request.company_id, &request.name)
        .await?;
    Ok(api_created(client))
}

pub async fn create_project(
    State(server): State<LedgerServer>,
    AppJson(request): AppJson<CreateProjectRequest>,
) -> ApiCreated<Project> {
    let project = server
        .service
        .practice()
        .create_project(request.client_id, &request.name)
        .await?;
    Ok(api_created(project))
}

pub async fn get_project(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<Project> {
    let project = server.service.practice().get_project(project_id).await?;
    Ok(api_success(project))
}

pub async fn record_invoice(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(request): AppJson<RecordInvoiceRequest>,
) -> ApiCreated<Invoice> {
    let invoice = server
        .service
        .practice()
        .record_invoice(
            project_id,
            &request.number,
            request.amount,
            &request.currency,
            request.issued_on,
        )
        .await?;
    Ok(api_created(invoice))
}

pub async fn record_time_entry(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(request): AppJson<RecordTimeEntryRequest>,
) -> ApiCreated<TimeEntry> {
    let entry = server
        .service
        .practice()
        .record_time_entry(
            project_id,
            request.lawyer_id,
            request.hours,
            request.rate,
            request.worked_on,
            &request.description,
        )
        .await?;
    Ok(api_created(entry))
}

pub async fn assign_lawyer(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(request): AppJson<AssignLawyerRequest>,
) -> ApiCreated<ProjectAssignment> {
    let assignment = server
        .service
        .practice()
        .assign_lawyer(project_id, request.lawyer_id, &request.position)
        .await?;
    Ok(api_created(assignment))
}

pub async fn list_lawyers(
    State(server): State<LedgerServer>,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<LawyersQuery>,
) -> ApiResult<Vec<ProjectAssignment>> {
    let lawyers = server
        .service
        .practice()
        .list_lawyers(project_id, query.position.as_deref())
        .await?;
    Ok(api_success(lawyers))
}
