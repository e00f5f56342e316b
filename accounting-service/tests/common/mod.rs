#![allow(dead_code)]

use accounting_service::store::{InMemoryLedgerStore, LedgerStore};
use accounting_service::*;
use chrono::NaiveDate;
use logger_redacted::PiiRedactor;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One company with a client, a project and a small chart of accounts
pub struct Fixture {
    pub store: Arc<InMemoryLedgerStore>,
    pub service: AccountingService,
    pub company_id: Uuid,
    pub client: Client,
    pub project: Project,
    pub cash: Account,
    pub trust_bank: Account,
    pub trust_liability: Account,
    pub income: Account,
    pub expense: Account,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_policy(LedgerPolicy::default()).await
    }

    pub async fn with_policy(policy: LedgerPolicy) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        let shared: Arc<dyn LedgerStore> = store.clone();
        let service = AccountingService::new(shared, policy, PiiRedactor::default()).unwrap();
        let company_id = Uuid::new_v4();

        let client = service.practice().create_client(company_id, "Nile Holdings").await.unwrap();
        let project = service
            .practice()
            .create_project(client.id, "Share purchase")
            .await
            .unwrap();

        let accounts = service.accounts();
        let cash = accounts
            .create_account(company_id, "1000", "Operating Cash", AccountType::Asset)
            .await
            .unwrap();
        let trust_bank = accounts
            .create_account(company_id, "1020", "Trust Bank", AccountType::Asset)
            .await
            .unwrap();
        let trust_liability = accounts
            .create_account(company_id, "2000", "Client Trust Liability", AccountType::Liability)
            .await
            .unwrap();
        let income = accounts
            .create_account(company_id, "4000", "Legal Fees", AccountType::Income)
            .await
            .unwrap();
        let expense = accounts
            .create_account(company_id, "5000", "Court Fees", AccountType::Expense)
            .await
            .unwrap();

        Self {
            store,
            service,
            company_id,
            client,
            project,
            cash,
            trust_bank,
            trust_liability,
            income,
            expense,
        }
    }

    /// Cash receipt for fees: debit cash, credit income
    pub async fn post_fee(&self, on: NaiveDate, amount: Decimal) -> Transaction {
        self.service
            .ledger()
            .post_transaction(
                self.company_id,
                on,
                vec![
                    NewLine::new(self.cash.id, amount),
                    NewLine::new(self.income.id, -amount),
                ],
            )
            .await
            .unwrap()
    }

    pub async fn retainer(&self) -> TrustAccount {
        self.service
            .trust()
            .get_or_create_trust_account(self.project.id, self.client.id, TrustAccountType::Retainer, "USD")
            .await
            .unwrap()
    }
}
