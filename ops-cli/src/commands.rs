use accounting_service::{exchange_rate_key, standard_chart, AccountingError, AccountingService};
use error_common::{codes, ErrorCategory, ErrorClassification};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::cli::Command;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("'{0}' deletes data and needs --confirm")]
    ConfirmationRequired(&'static str),

    #[error("'{0}' is not handled by the ledger service")]
    Unsupported(&'static str),

    #[error(transparent)]
    Accounting(#[from] AccountingError),
}

impl ErrorClassification for OpsError {
    fn category(&self) -> ErrorCategory {
        match self {
            OpsError::ConfirmationRequired(_) | OpsError::Unsupported(_) => ErrorCategory::Validation,
            OpsError::Accounting(e) => e.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            OpsError::ConfirmationRequired(_) | OpsError::Unsupported(_) => {
                codes::validation::MISSING_REQUIRED_FIELD
            }
            OpsError::Accounting(e) => e.code(),
        }
    }
}

/// One-line summary for people, structured details for `--json`
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub summary: String,
    pub details: Value,
}

impl CommandOutput {
    fn new(summary: impl Into<String>, details: impl Serialize) -> Self {
        Self {
            summary: summary.into(),
            details: serde_json::to_value(details).unwrap_or(Value::Null),
        }
    }

    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            serde_json::to_string_pretty(&json!({
                "summary": self.summary,
                "details": self.details,
            }))
            .unwrap_or_else(|_| self.summary.clone())
        } else {
            self.summary.clone()
        }
    }
}

/// Run a ledger command against the service. `migrate` needs the raw pool
/// and is handled by the caller.
pub async fn execute(service: &AccountingService, command: &Command) -> Result<CommandOutput, OpsError> {
    if command.confirmation() == Some(false) {
        return Err(OpsError::ConfirmationRequired(command.name()));
    }
    info!(command = command.name(), "Running maintenance command");

    let output = match command {
        Command::Migrate => return Err(OpsError::Unsupported(command.name())),

        Command::WipeFinancials { company, .. } => {
            let report = service.maintenance().wipe_company_financials(*company).await?;
            let mut summary = format!("Wiped company {}: {} rows removed", company, report.total_rows());
            for step in &report.steps {
                summary.push_str(&format!("\n  {:<20} {}", step.table.as_str(), step.rows));
            }
            CommandOutput::new(summary, &report)
        }

        Command::ResetCoa { company, .. } => {
            let accounts = service
                .accounts()
                .reset_chart_of_accounts(*company, standard_chart())
                .await?;
            let mut summary = format!("Chart of accounts reset for {}: {} accounts", company, accounts.len());
            for account in &accounts {
                summary.push_str(&format!("\n  {} {} ({})", account.code, account.name, account.account_type));
            }
            CommandOutput::new(summary, &accounts)
        }

        Command::DeleteProject { project, .. } => {
            let report = service.maintenance().delete_project(*project).await?;
            let orphaned = report.rows_for(accounting_service::store::LedgerTable::TrustAccounts);
            CommandOutput::new(
                format!(
                    "Deleted project {}: {} rows removed, {} trust account(s) orphaned",
                    project,
                    report.total_rows(),
                    orphaned
                ),
                &report,
            )
        }

        Command::FindOrphans => {
            let orphans = service.trust().find_orphan_trust_accounts().await?;
            let mut summary = format!("{} orphaned trust account(s)", orphans.len());
            for orphan in &orphans {
                summary.push_str(&format!(
                    "\n  {} client={} {} {} balance={}",
                    orphan.id, orphan.client_id, orphan.account_type, orphan.currency, orphan.balance
                ));
            }
            CommandOutput::new(summary, &orphans)
        }

        Command::PurgeOrphans { .. } => {
            let report = service.trust().purge_orphan_trust_accounts().await?;
            let mut summary = format!(
                "Purged {} orphaned trust account(s) and {} transaction(s), {} failed",
                report.purged.len(),
                report.transactions_removed(),
                report.failed.len()
            );
            for failure in &report.failed {
                summary.push_str(&format!("\n  failed {}: {}", failure.trust_account_id, failure.error));
            }
            CommandOutput::new(summary, &report)
        }

        Command::SetRate { base, quote, rate } => {
            let key = exchange_rate_key(base, quote)?;
            let value = service.settings().set_exchange_rate(&key, rate).await?;
            CommandOutput::new(format!("{} = {}", key, value), json!({ "key": key, "rate": value }))
        }

        Command::GetRate { base, quote } => {
            let key = exchange_rate_key(base, quote)?;
            match service.settings().get_exchange_rate(&key).await? {
                Some(rate) => CommandOutput::new(format!("{} = {}", key, rate), json!({ "key": key, "rate": rate })),
                None => return Err(AccountingError::not_found("exchange rate", key).into()),
            }
        }

        Command::Reconcile { company, currency } => {
            let result = service.trust().reconcile(*company, currency).await?;
            let status = if result.in_balance { "in balance" } else { "OUT OF BALANCE" };
            CommandOutput::new(
                format!(
                    "Trust {} for {}: subledger {} vs ledger {} ({}, difference {})",
                    result.currency,
                    company,
                    result.subledger_total,
                    result.ledger_balance,
                    status,
                    result.difference
                ),
                &result,
            )
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounting_service::{AccountType, TrustAccountType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[tokio::test]
    async fn destructive_commands_need_confirmation() {
        let service = AccountingService::in_memory();
        let company = Uuid::new_v4();
        service
            .accounts()
            .create_account(company, "1000", "Cash", AccountType::Asset)
            .await
            .unwrap();

        let err = execute(&service, &Command::WipeFinancials { company, confirm: false })
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::ConfirmationRequired("wipe-financials")));
        assert_eq!(err.category().exit_code(), 2);
        assert_eq!(service.accounts().list_accounts(company).await.unwrap().len(), 1);

        let output = execute(&service, &Command::WipeFinancials { company, confirm: true })
            .await
            .unwrap();
        assert!(output.summary.contains("1 rows removed"));
    }

    #[tokio::test]
    async fn reset_lists_seeded_accounts() {
        let service = AccountingService::in_memory();
        let output = execute(
            &service,
            &Command::ResetCoa {
                company: Uuid::new_v4(),
                confirm: true,
            },
        )
        .await
        .unwrap();
        assert!(output.summary.contains("5 accounts"));
        assert!(output.summary.contains("4000 Legal Fees (INCOME)"));
        assert_eq!(output.details.as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn orphans_are_found_then_purged() {
        let service = AccountingService::in_memory();
        let client = service.practice().create_client(Uuid::new_v4(), "Aswan Foods").await.unwrap();
        let project = service.practice().create_project(client.id, "Merger").await.unwrap();
        let trust = service
            .trust()
            .get_or_create_trust_account(project.id, client.id, TrustAccountType::Retainer, "EGP")
            .await
            .unwrap();
        service
            .trust()
            .post_trust_transaction(
                trust.id,
                dec!(1500),
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                "Deposit",
            )
            .await
            .unwrap();
        execute(
            &service,
            &Command::DeleteProject {
                project: project.id,
                confirm: true,
            },
        )
        .await
        .unwrap();

        let found = execute(&service, &Command::FindOrphans).await.unwrap();
        assert!(found.summary.starts_with("1 orphaned"));

        let purged = execute(&service, &Command::PurgeOrphans { confirm: true }).await.unwrap();
        assert!(purged.summary.contains("Purged 1 orphaned trust account(s) and 1 transaction(s), 0 failed"));

        let again = execute(&service, &Command::FindOrphans).await.unwrap();
        assert!(again.summary.starts_with("0 orphaned"));
    }

    #[tokio::test]
    async fn rates_round_trip_and_missing_rate_is_not_found() {
        let service = AccountingService::in_memory();
        let missing = execute(
            &service,
            &Command::GetRate {
                base: "EGP".into(),
                quote: "USD".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        let set = execute(
            &service,
            &Command::SetRate {
                base: "egp".into(),
                quote: "usd".into(),
                rate: "50.75".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(set.summary, "EX_RATE_EGP_USD = 50.75");

        let bad = execute(
            &service,
            &Command::SetRate {
                base: "EGP".into(),
                quote: "USD".into(),
                rate: "fifty".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(bad.code(), codes::ledger::INVALID_RATE);
    }

    #[test]
    fn json_rendering_wraps_summary_and_details() {
        let output = CommandOutput::new("done", json!({ "rows": 3 }));
        let rendered: Value = serde_json::from_str(&output.render(true)).unwrap();
        assert_eq!(rendered["details"]["rows"], 3);
        assert_eq!(output.render(false), "done");
    }
}
