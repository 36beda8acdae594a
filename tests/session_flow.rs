//! Drives a `LedgerSession` through the public API against each storage backend.

use chrono::Utc;
use expense_tracker::ledger::{aggregate, Draft, LedgerSession, LedgerSettings};
use expense_tracker::model::{Category, PaymentType, Tab};
use expense_tracker::storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
use expense_tracker::SubmitError;
use rust_decimal::Decimal;
use tempfile::TempDir;

fn draft(amount: &str, category: Category) -> Draft {
    Draft::new(Utc::now())
        .with_amount(amount)
        .with_category(category)
}

fn ids(session_list: &[expense_tracker::model::Transaction]) -> Vec<String> {
    session_list.iter().map(|t| t.id().to_string()).collect()
}

/// Salary then Food, check the totals and tabs, then reopen through `reopen` and check that
/// everything survived.
async fn salary_then_food<F, Fut>(first: Box<dyn Storage>, reopen: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Box<dyn Storage>>,
{
    let session = LedgerSession::new(first, LedgerSettings::default());
    assert!(session.load_ledger().await.is_none());

    session
        .submit_draft(&draft("50", Category::Salary))
        .await
        .unwrap();
    session
        .submit_draft(&draft("20", Category::Food).with_payment_type(PaymentType::Card))
        .await
        .unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.income(), Decimal::from(50));
    assert_eq!(snapshot.spent(), Decimal::from(20));
    assert_eq!(snapshot.totals.balance(), Decimal::from(30));
    assert_eq!(ids(&snapshot.displayed), vec!["2", "1"]);

    session.select_tab(Tab::Category(Category::Food)).await;
    assert_eq!(ids(&session.snapshot().await.displayed), vec!["2"]);

    let err = session
        .submit_draft(&draft("0", Category::Coffee))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Entry(_)));
    assert_eq!(session.transactions().await.len(), 2);
    drop(session);

    let reopened = LedgerSession::new(reopen().await, LedgerSettings::default());
    assert!(reopened.load_ledger().await.is_none());
    let transactions = reopened.transactions().await;
    assert_eq!(ids(&transactions), vec!["1", "2"]);
    assert_eq!(reopened.totals().await, aggregate(&transactions));
    assert_eq!(transactions[1].payment_type(), PaymentType::Card);

    let next = reopened
        .submit_draft(&draft("7", Category::Coffee))
        .await
        .unwrap();
    assert_eq!(next.id(), "3");
}

#[tokio::test]
async fn memory_backend() {
    let memory = MemoryStorage::new();
    let handle = memory.clone();
    salary_then_food(Box::new(memory), || async move {
        Box::new(handle) as Box<dyn Storage>
    })
    .await;
}

#[tokio::test]
async fn file_backend() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    let first = FileStorage::new(&store).await.unwrap();
    salary_then_food(Box::new(first), || async move {
        Box::new(FileStorage::new(&store).await.unwrap()) as Box<dyn Storage>
    })
    .await;
}

#[tokio::test]
async fn sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.sqlite");
    let first = SqliteStorage::open(&path).await.unwrap();
    salary_then_food(Box::new(first), || async move {
        Box::new(SqliteStorage::open(&path).await.unwrap()) as Box<dyn Storage>
    })
    .await;
}

#[tokio::test]
async fn failed_write_keeps_previous_state() {
    let memory = MemoryStorage::new();
    let session = LedgerSession::new(Box::new(memory.clone()), LedgerSettings::default());
    session.load_ledger().await;
    session
        .submit_draft(&draft("50", Category::Freelance))
        .await
        .unwrap();
    let before = session.snapshot().await;

    memory.fail_next_writes(10);
    let err = session
        .submit_draft(&draft("20", Category::Transport))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Persistence(_)));
    assert_eq!(session.snapshot().await, before);
}
