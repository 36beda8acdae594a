//! Command handlers for the expense CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod categories;
mod check;
mod init;
mod list;
mod summary;

use crate::backup::CORRUPT_LEDGER;
use crate::display::{amount_color, display_color, format_long_date, Rgb};
use crate::ledger::{LedgerSession, LoadProblem};
use crate::model::{Amount, Category, PaymentType, Transaction};
use crate::{storage, Config, Result};
use chrono::Local;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use add::add;
pub use categories::{categories, CategoryInfo, Taxonomy};
pub use check::{check, CheckReport};
pub use init::init;
pub use list::list;
pub use summary::{summary, Chart, Summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// One row of the transaction list, with everything needed to draw it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TransactionLine {
    pub id: String,
    pub amount: Amount,
    pub amount_text: String,
    pub amount_color: &'static str,
    pub category: Category,
    pub payment_type: PaymentType,
    pub date: String,
    pub icon: String,
    pub color: Rgb,
}

impl From<&Transaction> for TransactionLine {
    fn from(t: &Transaction) -> Self {
        let sign = if t.is_income() { "+" } else { "-" };
        Self {
            id: t.id().to_string(),
            amount: t.amount(),
            amount_text: format!("{sign}{}", t.amount()),
            amount_color: amount_color(t.flow_class()),
            category: t.category(),
            payment_type: t.payment_type(),
            date: format_long_date(t.date().with_timezone(&Local).date_naive()),
            icon: t.category().icon().to_string(),
            color: display_color(t.display_key()),
        }
    }
}

impl TransactionLine {
    fn render(&self) -> String {
        format!(
            "{:>6}  {:<13} {:>10}  {:<5} {}",
            self.id,
            self.category.as_str(),
            self.amount_text,
            self.payment_type.to_string(),
            self.date
        )
    }
}

/// Opens the configured backend and loads the ledger.
///
/// A ledger that cannot be parsed is copied to the backups directory before anything can
/// overwrite it. The first time any ledger is opened the user is greeted and the launch flag is
/// set.
async fn open_session(config: &Config) -> Result<(LedgerSession, Option<LoadProblem>)> {
    let storage = storage::open(config).await?;
    let session = LedgerSession::new(storage, config.settings());

    let problem = session.load_ledger().await;
    if let Some(raw) = problem.as_ref().and_then(|p| p.raw.as_deref()) {
        match config.backup().save_raw(CORRUPT_LEDGER, raw).await {
            Ok(path) => warn!(
                "The stored ledger could not be read, a copy was saved to {}",
                path.display()
            ),
            Err(e) => warn!("Unable to save a copy of the unreadable ledger: {e:#}"),
        }
    }

    if !session.has_launched().await {
        info!("Welcome to Expense Tracker! Record a transaction with 'expense add <amount>'.");
        if let Err(e) = session.mark_launched().await {
            warn!("{e:#}");
        }
    }

    Ok((session, problem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{APP_HAS_LAUNCHED_KEY, TRANSACTIONS_KEY};
    use crate::test::TestEnv;
    use crate::utils;

    #[tokio::test]
    async fn test_open_session_preserves_corrupt_ledger() {
        let env = TestEnv::new().await;
        let config = env.config();
        utils::write(
            config.store_dir().join(format!("{TRANSACTIONS_KEY}.json")),
            "not json",
        )
        .await
        .unwrap();

        let (session, problem) = open_session(&config).await.unwrap();
        assert!(problem.is_some());
        assert!(session.transactions().await.is_empty());

        let mut found = Vec::new();
        let mut entries = utils::read_dir(config.backups()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            found.push(entry.path());
        }
        assert_eq!(found.len(), 1);
        assert_eq!(utils::read(&found[0]).await.unwrap(), "not json");
    }

    #[tokio::test]
    async fn test_open_session_sets_launch_flag() {
        let env = TestEnv::new().await;
        let config = env.config();
        let flag = config.store_dir().join(format!("{APP_HAS_LAUNCHED_KEY}.json"));
        assert!(!flag.exists());
        let (session, problem) = open_session(&config).await.unwrap();
        assert!(problem.is_none());
        assert!(session.has_launched().await);
        assert!(flag.exists());
    }

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }
}
