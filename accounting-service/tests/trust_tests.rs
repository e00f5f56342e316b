mod common;

use accounting_service::store::LedgerStore;
use accounting_service::*;
use common::{date, Fixture};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_get_or_create_converges_on_one_account() {
    let fx = Arc::new(Fixture::new().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let fx = fx.clone();
        handles.push(tokio::spawn(async move {
            fx.service
                .trust()
                .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Retainer, "USD")
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id);
    }
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn lost_creation_race_rereads_the_winner() {
    let fx = Fixture::new().await;
    let winner = fx.retainer().await;

    // The next lookup misses, so the insert collides with the existing row
    fx.store.hide_trust_accounts_for(1);
    let account = fx.retainer().await;
    assert_eq!(account.id, winner.id);
}

#[tokio::test]
async fn persistent_conflicts_give_up_after_the_retry_budget() {
    let fx = Fixture::new().await;
    fx.retainer().await;

    fx.store.hide_trust_accounts_for(100);
    let err = fx
        .service
        .trust()
        .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Retainer, "USD")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountingError::Conflict(_)));
}

#[tokio::test]
async fn trust_accounts_are_keyed_by_type_and_currency() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let usd = fx.retainer().await;
    let egp = trust
        .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Retainer, "egp")
        .await
        .unwrap();
    let expense = trust
        .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Expense, "USD")
        .await
        .unwrap();

    assert_ne!(usd.id, egp.id);
    assert_ne!(usd.id, expense.id);
    assert_eq!(egp.currency, "EGP");
    assert_eq!(usd.balance, Decimal::ZERO);
}

#[tokio::test]
async fn retainer_cannot_be_overdrawn() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let account = fx.retainer().await;

    let deposit = trust
        .post_trust_transaction(account.id, dec!(1000), date(2024, 2, 1), "Initial retainer")
        .await
        .unwrap();
    assert_eq!(deposit.balance, dec!(1000));

    let err = trust
        .post_trust_transaction(account.id, dec!(-1500), date(2024, 2, 2), "Filing fees")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountingError::NegativeBalance { balance, .. } if balance == dec!(1000)));

    let after = trust.get_trust_account(account.id).await.unwrap();
    assert_eq!(after.balance, dec!(1000));
    assert_eq!(trust.list_trust_transactions(account.id).await.unwrap().len(), 1);

    let exact = trust
        .post_trust_transaction(account.id, dec!(-1000), date(2024, 2, 3), "Refund")
        .await
        .unwrap();
    assert_eq!(exact.balance, Decimal::ZERO);
}

#[tokio::test]
async fn oversized_trust_postings_are_rejected() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let account = fx.retainer().await;

    let err = trust
        .post_trust_transaction(account.id, Decimal::MAX, date(2024, 2, 1), "Wire")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountingError::Validation(_)));

    let largest = dec!(99999999999999.99);
    trust
        .post_trust_transaction(account.id, largest, date(2024, 2, 1), "Wire")
        .await
        .unwrap();
    let err = trust
        .post_trust_transaction(account.id, largest, date(2024, 2, 2), "Second wire")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountingError::Validation(_)));

    let after = trust.get_trust_account(account.id).await.unwrap();
    assert_eq!(after.balance, largest);
    assert_eq!(trust.list_trust_transactions(account.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn expense_accounts_may_go_negative_by_default() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let account = trust
        .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Expense, "USD")
        .await
        .unwrap();

    let posting = trust
        .post_trust_transaction(account.id, dec!(-250), date(2024, 2, 1), "Courier advanced by firm")
        .await
        .unwrap();
    assert_eq!(posting.balance, dec!(-250));
}

#[tokio::test]
async fn stricter_policy_blocks_negative_expense_accounts() {
    let fx = Fixture::with_policy(LedgerPolicy {
        allow_negative_expense: false,
        ..LedgerPolicy::default()
    })
    .await;
    let trust = fx.service.trust();
    let account = trust
        .get_or_create_trust_account(fx.project.id, fx.client.id, TrustAccountType::Expense, "USD")
        .await
        .unwrap();

    let result = trust
        .post_trust_transaction(account.id, dec!(-1), date(2024, 2, 1), "Overdraw")
        .await;
    assert!(matches!(result, Err(AccountingError::NegativeBalance { .. })));
}

#[tokio::test]
async fn orphan_purge_is_idempotent() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let account = fx.retainer().await;
    trust
        .post_trust_transaction(account.id, dec!(300), date(2024, 1, 5), "Retainer")
        .await
        .unwrap();
    trust
        .post_trust_transaction(account.id, dec!(-100), date(2024, 1, 6), "Court fee")
        .await
        .unwrap();

    assert!(trust.find_orphan_trust_accounts().await.unwrap().is_empty());
    fx.service.maintenance().delete_project(fx.project.id).await.unwrap();

    let orphans = trust.find_orphan_trust_accounts().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, account.id);
    assert_eq!(orphans[0].project_id, None);

    let first = trust.purge_orphan_trust_accounts().await.unwrap();
    assert_eq!(first.purged.len(), 1);
    assert_eq!(first.transactions_removed(), 2);
    assert!(first.failed.is_empty());

    let second = trust.purge_orphan_trust_accounts().await.unwrap();
    assert_eq!(second, PurgeReport::default());
    assert!(fx.store.get_trust_account(account.id).await.unwrap().is_none());
}

#[tokio::test]
async fn one_failed_orphan_does_not_stop_the_rest() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let practice = fx.service.practice();

    for name in ["Appeal", "Arbitration"] {
        let project = practice.create_project(fx.client.id, name).await.unwrap();
        let account = trust
            .get_or_create_trust_account(project.id, fx.client.id, TrustAccountType::Retainer, "USD")
            .await
            .unwrap();
        trust
            .post_trust_transaction(account.id, dec!(10), date(2024, 1, 1), "Deposit")
            .await
            .unwrap();
        fx.service.maintenance().delete_project(project.id).await.unwrap();
    }

    fx.store.fail_next_batch_after(1);
    let report = trust.purge_orphan_trust_accounts().await.unwrap();
    assert_eq!(report.purged.len(), 1);
    assert_eq!(report.failed.len(), 1);

    let retry = trust.purge_orphan_trust_accounts().await.unwrap();
    assert_eq!(retry.purged.len(), 1);
    assert_eq!(retry.purged[0].trust_account_id, report.failed[0].trust_account_id);
    assert!(trust.find_orphan_trust_accounts().await.unwrap().is_empty());
}

#[tokio::test]
async fn reconciliation_compares_subledger_with_trust_bank() {
    let fx = Fixture::new().await;
    let trust = fx.service.trust();
    let account = fx.retainer().await;

    trust
        .post_trust_transaction(account.id, dec!(500), date(2024, 3, 1), "Retainer received")
        .await
        .unwrap();
    fx.service
        .ledger()
        .post_transaction(
            fx.company_id,
            date(2024, 3, 1),
            vec![
                NewLine::new(fx.trust_bank.id, dec!(500)),
                NewLine::new(fx.trust_liability.id, dec!(-500)),
            ],
        )
        .await
        .unwrap();

    let matched = trust.reconcile(fx.company_id, "USD").await.unwrap();
    assert!(matched.in_balance);
    assert_eq!(matched.subledger_total, dec!(500));

    trust
        .post_trust_transaction(account.id, dec!(25), date(2024, 3, 2), "Top-up")
        .await
        .unwrap();
    let drifted = trust.reconcile(fx.company_id, "USD").await.unwrap();
    assert!(!drifted.in_balance);
    assert_eq!(drifted.difference, dec!(25));
}
