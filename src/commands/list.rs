use crate::commands::{open_session, Out, TransactionLine};
use crate::model::Tab;
use crate::{Config, Result};

/// Lists the transactions under `tab` in the configured display order.
pub async fn list(config: &Config, tab: Tab) -> Result<Out<Vec<TransactionLine>>> {
    let (session, _) = open_session(config).await?;
    session.select_tab(tab).await;
    let snapshot = session.snapshot().await;

    let lines: Vec<TransactionLine> = snapshot
        .displayed
        .iter()
        .map(TransactionLine::from)
        .collect();

    if lines.is_empty() {
        return Ok(Out::new(format!("No transactions under {tab}"), lines));
    }

    let mut message = format!("{} transaction(s) under {tab}", lines.len());
    for line in &lines {
        message.push('\n');
        message.push_str(&line.render());
    }
    Ok(Out::new(message, lines))
}
