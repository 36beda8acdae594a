use crate::args::AddArgs;
use crate::commands::{open_session, Out, TransactionLine};
use crate::ledger::{Draft, LedgerSession, LoadProblem};
use crate::{Config, Result};
use anyhow::bail;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Records one transaction from the command line and reports the committed record.
pub async fn add(config: &Config, args: &AddArgs) -> Result<Out<TransactionLine>> {
    let (session, problem) = open_session(config).await?;
    record(&session, problem.as_ref(), args).await
}

/// Commits `args` to an already loaded `session`.
///
/// Refuses when the ledger could not be read at all: the stored records are unknown, and a write
/// would replace them with just the new one. A malformed ledger has already been copied to the
/// backups directory, so it does not block.
async fn record(
    session: &LedgerSession,
    problem: Option<&LoadProblem>,
    args: &AddArgs,
) -> Result<Out<TransactionLine>> {
    if let Some(problem) = problem.filter(|p| p.error.is_load()) {
        bail!(
            "Not recording the transaction because the ledger could not be read: {}",
            problem.error.describe()
        );
    }

    let now = Utc::now();
    let draft = Draft::new(now)
        .with_amount(args.amount())
        .with_category(args.category())
        .with_payment_type(args.payment_type())
        .with_date(transaction_instant(args.date(), now));

    let transaction = session.submit_draft(&draft).await?;
    let line = TransactionLine::from(&transaction);
    Ok(Out::new(
        format!(
            "Added {} {} ({}) on {}",
            line.category.as_str(),
            line.amount_text,
            line.payment_type,
            line.date
        ),
        line,
    ))
}

/// The instant recorded for a transaction entered on `date`. Today, or no date at all, means now;
/// any other day means the start of that day in local time.
fn transaction_instant(date: Option<NaiveDate>, now: DateTime<Utc>) -> DateTime<Utc> {
    match date {
        Some(d) if d != now.with_timezone(&Local).date_naive() => Local
            .from_local_datetime(&d.and_time(NaiveTime::default()))
            .earliest()
            .map_or(now, |start| start.with_timezone(&Utc)),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerSettings;
    use crate::model::Category;
    use crate::storage::{MemoryStorage, TRANSACTIONS_KEY};
    use crate::test::TestEnv;

    #[test]
    fn test_transaction_instant() {
        let now = Utc::now();
        assert_eq!(transaction_instant(None, now), now);
        assert_eq!(
            transaction_instant(Some(now.with_timezone(&Local).date_naive()), now),
            now
        );
    }

    #[test]
    fn test_back_dated_instant_falls_on_the_local_day() {
        let now = Utc::now();
        let past = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let instant = transaction_instant(Some(past), now);
        assert_eq!(instant.with_timezone(&Local).date_naive(), past);
    }

    #[tokio::test]
    async fn test_add() {
        let env = TestEnv::new().await;
        let config = env.config();

        let out = add(&config, &AddArgs::new("50", Category::Salary))
            .await
            .unwrap();
        let line = out.structure().unwrap();
        assert_eq!(line.id, "1");
        assert_eq!(line.amount_text, "+$50");
        assert_eq!(line.color.to_string(), "#e6c9e8");

        let out = add(&config, &AddArgs::new("20", Category::Food))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().id, "2");
        assert_eq!(out.structure().unwrap().amount_text, "-$20");
    }

    #[tokio::test]
    async fn test_add_back_dated_shows_entered_day() {
        let env = TestEnv::new().await;
        let past = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let out = add(
            &env.config(),
            &AddArgs::new("12", Category::Transport).with_date(past),
        )
        .await
        .unwrap();
        assert_eq!(out.structure().unwrap().date, "March 9, 2024");
    }

    #[tokio::test]
    async fn test_add_rejects_unset_amount() {
        let env = TestEnv::new().await;
        let err = add(&env.config(), &AddArgs::new("0", Category::Food))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid amount"));
    }

    #[tokio::test]
    async fn test_unreadable_ledger_is_not_overwritten() {
        let stored = r#"[
            {"id":"1","amount":50,"category":"Salary","paymentType":"Cash","date":"2025-01-01T00:00:00.000Z"},
            {"id":"2","amount":20,"category":"Food","paymentType":"Card","date":"2025-01-02T00:00:00.000Z"}
        ]"#;
        let memory = MemoryStorage::with_entries([(TRANSACTIONS_KEY, stored)]);
        let session = LedgerSession::new(Box::new(memory.clone()), LedgerSettings::default());

        memory.fail_reads(true);
        let problem = session.load_ledger().await.unwrap();
        assert!(problem.error.is_load());
        memory.fail_reads(false);

        let err = record(
            &session,
            Some(&problem),
            &AddArgs::new("5", Category::Coffee),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("could not be read"));
        assert_eq!(memory.value(TRANSACTIONS_KEY).as_deref(), Some(stored));
        assert!(session.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ledger_does_not_block() {
        let memory = MemoryStorage::with_entries([(TRANSACTIONS_KEY, "[{")]);
        let session = LedgerSession::new(Box::new(memory.clone()), LedgerSettings::default());
        let problem = session.load_ledger().await.unwrap();
        assert!(!problem.error.is_load());

        let out = record(&session, Some(&problem), &AddArgs::new("5", Category::Coffee))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().id, "1");
    }
}
