use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AccountingError, AccountingResult, StoreError};
use crate::models::*;
use crate::policy::{normalize_currency, LedgerPolicy};
use crate::store::{LedgerStore, Mutation, WriteBatch};
use crate::validation::{constraint_error, required};

/// Clients, projects and the billing records the ledger points at
pub struct PracticeRecords {
    store: Arc<dyn LedgerStore>,
    policy: Arc<LedgerPolicy>,
}

impl PracticeRecords {
    pub fn new(store: Arc<dyn LedgerStore>, policy: Arc<LedgerPolicy>) -> Self {
        Self { store, policy }
    }

    async fn write(&self, mutation: Mutation) -> AccountingResult<()> {
        self.store
            .apply(WriteBatch::new().with(mutation))
            .await
            .map_err(constraint_error)?;
        Ok(())
    }

    async fn require_project(&self, project_id: Uuid) -> AccountingResult<Project> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("project", project_id))
    }

    pub async fn create_client(&self, company_id: Uuid, name: &str) -> AccountingResult<Client> {
        let client = Client {
            id: Uuid::new_v4(),
            company_id,
            name: required("client name", name)?,
        };
        self.write(Mutation::InsertClient(client.clone())).await?;
        info!(company_id = %company_id, client_id = %client.id, "Client created");
        Ok(client)
    }

    pub async fn get_client(&self, client_id: Uuid) -> AccountingResult<Client> {
        self.store
            .get_client(client_id)
            .await?
            .ok_or_else(|| AccountingError::not_found("client", client_id))
    }

    pub async fn create_project(&self, client_id: Uuid, name: &str) -> AccountingResult<Project> {
        let name = required("project name", name)?;
        self.get_client(client_id).await?;

        let project = Project {
            id: Uuid::new_v4(),
            client_id,
            name,
        };
        self.write(Mutation::InsertProject(project.clone())).await?;
        info!(client_id = %client_id, project_id = %project.id, "Project created");
        Ok(project)
    }

    pub async fn get_project(&self, project_id: Uuid) -> AccountingResult<Project> {
        self.require_project(project_id).await
    }

    pub async fn record_invoice(
        &self,
        project_id: Uuid,
        number: &str,
        amount: Decimal,
        currency: &str,
        issued_on: NaiveDate,
    ) -> AccountingResult<Invoice> {
        let number = required("invoice number", number)?;
        let currency = normalize_currency(currency)?;
        if amount <= Decimal::ZERO {
            return Err(AccountingError::Validation(
                "invoice amount must be positive".to_string(),
            ));
        }
        self.policy.check_precision(amount, &currency)?;
        self.require_project(project_id).await?;

        let invoice = Invoice {
            id: Uuid::new_v4(),
            project_id,
            number,
            amount,
            currency,
            issued_on,
        };
        self.write(Mutation::InsertInvoice(invoice.clone())).await?;
        info!(project_id = %project_id, invoice_id = %invoice.id, "Invoice recorded");
        Ok(invoice)
    }

    pub async fn record_time_entry(
        &self,
        project_id: Uuid,
        lawyer_id: Uuid,
        hours: Decimal,
        rate: Decimal,
        worked_on: NaiveDate,
        description: &str,
    ) -> AccountingResult<TimeEntry> {
        if hours <= Decimal::ZERO {
            return Err(AccountingError::Validation("hours must be positive".to_string()));
        }
        if rate < Decimal::ZERO {
            return Err(AccountingError::Validation("rate must not be negative".to_string()));
        }
        self.require_project(project_id).await?;

        let entry = TimeEntry {
            id: Uuid::new_v4(),
            project_id,
            lawyer_id,
            hours,
            rate,
            worked_on,
            description: description.trim().to_string(),
        };
        self.write(Mutation::InsertTimeEntry(entry.clone())).await?;
        info!(project_id = %project_id, time_entry_id = %entry.id, "Time entry recorded");
        Ok(entry)
    }

    /// Staff a lawyer on a project in the given position
    pub async fn assign_lawyer(
        &self,
        project_id: Uuid,
        lawyer_id: Uuid,
        position: &str,
    ) -> AccountingResult<ProjectAssignment> {
        let position = required("position", position)?;
        self.require_project(project_id).await?;

        let assignment = ProjectAssignment {
            id: Uuid::new_v4(),
            project_id,
            lawyer_id,
            position,
        };
        match self
            .store
            .apply(WriteBatch::new().with(Mutation::InsertAssignment(assignment.clone())))
            .await
        {
            Ok(_) => Ok(assignment),
            Err(StoreError::UniqueViolation(_)) => Err(AccountingError::Conflict(format!(
                "lawyer {} is already assigned to project {}",
                lawyer_id, project_id
            ))),
            Err(e) => Err(constraint_error(e)),
        }
    }

    /// Assignments of a project, optionally only one position
    pub async fn list_lawyers(
        &self,
        project_id: Uuid,
        position: Option<&str>,
    ) -> AccountingResult<Vec<ProjectAssignment>> {
        self.require_project(project_id).await?;
        let assignments = self.store.list_assignments(project_id).await?;
        Ok(match position {
            Some(position) => assignments
                .into_iter()
                .filter(|a| a.position.eq_ignore_ascii_case(position.trim()))
                .collect(),
            None => assignments,
        })
    }
}
