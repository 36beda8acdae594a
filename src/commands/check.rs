use crate::commands::{open_session, Out};
use crate::ledger::Totals;
use crate::{Config, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// What `check` found.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CheckReport {
    pub transactions: usize,
    pub totals: Totals,
    /// Set when the stored ledger could not be read and was treated as empty.
    pub load_problem: Option<String>,
    /// Ids that appear on more than one record.
    pub duplicate_ids: Vec<String>,
    pub totals_repaired: bool,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.load_problem.is_none() && self.duplicate_ids.is_empty() && !self.totals_repaired
    }
}

/// Loads the ledger and looks for anything that should not be there.
pub async fn check(config: &Config) -> Result<Out<CheckReport>> {
    let (session, problem) = open_session(config).await?;
    let totals_repaired = session.reconcile_totals().await;
    let transactions = session.transactions().await;

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &transactions {
        *seen.entry(t.id()).or_default() += 1;
    }
    let duplicate_ids: Vec<String> = seen
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    for id in &duplicate_ids {
        warn!("The id '{id}' is used by more than one transaction");
    }

    let report = CheckReport {
        transactions: transactions.len(),
        totals: session.totals().await,
        load_problem: problem.map(|p| p.error.describe()),
        duplicate_ids,
        totals_repaired,
    };

    let message = if report.is_healthy() {
        format!("The ledger is healthy ({} transaction(s))", report.transactions)
    } else {
        format!(
            "The ledger has problems: {} duplicate id(s), unreadable: {}",
            report.duplicate_ids.len(),
            report.load_problem.as_deref().unwrap_or("no")
        )
    };
    Ok(Out::new(message, report))
}
