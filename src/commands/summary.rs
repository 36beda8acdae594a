use crate::commands::{open_session, Out};
use crate::display::{INCOME_LEGEND_COLOR, SPENT_LEGEND_COLOR};
use crate::model::Amount;
use crate::{Config, Result};
use serde::Serialize;

/// Income, spending, and the balance between them over the whole ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub income: Amount,
    pub spent: Amount,
    pub balance: Amount,
    pub transactions: usize,
    pub chart: Option<Chart>,
}

/// The two-series chart of income against spending, present only when both are non-zero.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Chart {
    pub income: Amount,
    pub income_color: &'static str,
    pub spent: Amount,
    pub spent_color: &'static str,
}

pub async fn summary(config: &Config) -> Result<Out<Summary>> {
    let (session, _) = open_session(config).await?;
    let snapshot = session.snapshot().await;
    let totals = snapshot.totals;

    let summary = Summary {
        income: Amount::new(totals.income),
        spent: Amount::new(totals.spent),
        balance: Amount::new(totals.balance()),
        transactions: snapshot.displayed.len(),
        chart: totals.chart_series().map(|(income, spent)| Chart {
            income: Amount::new(income),
            income_color: INCOME_LEGEND_COLOR,
            spent: Amount::new(spent),
            spent_color: SPENT_LEGEND_COLOR,
        }),
    };

    let message = format!(
        "Income {}, spent {}, balance {} across {} transaction(s)",
        summary.income, summary.spent, summary.balance, summary.transactions
    );
    Ok(Out::new(message, summary))
}
