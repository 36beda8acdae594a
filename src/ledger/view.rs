//! Deriving the displayed list: filter by tab, then order.

use crate::model::{Tab, Transaction};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How the displayed list is ordered. Every order is newest-first in some sense.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Ids compared as strings, descending. `"2"` sorts before `"10"`.
    #[default]
    IdLexicographic,
    /// Numeric ids compared as numbers, descending, with non-numeric ids after them.
    IdNumeric,
    /// Newest date first, ties broken by id descending.
    DateDescending,
}

serde_plain::derive_display_from_serialize!(DisplayOrder);
serde_plain::derive_fromstr_from_deserialize!(DisplayOrder);

impl DisplayOrder {
    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            DisplayOrder::IdLexicographic => b.id().cmp(a.id()),
            DisplayOrder::IdNumeric => {
                match (a.id().parse::<u64>().ok(), b.id().parse::<u64>().ok()) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
                .then_with(|| b.id().cmp(a.id()))
            }
            DisplayOrder::DateDescending => b
                .date()
                .cmp(&a.date())
                .then_with(|| b.id().cmp(a.id())),
        }
    }
}

/// The transactions under `tab`, in ledger order.
pub fn select_tab(all: &[Transaction], tab: Tab) -> Vec<Transaction> {
    all.iter()
        .filter(|t| tab.admits(t.category()))
        .cloned()
        .collect()
}

/// Orders `transactions` for display. The sort is stable.
pub fn sort_for_display(mut transactions: Vec<Transaction>, order: DisplayOrder) -> Vec<Transaction> {
    transactions.sort_by(|a, b| order.compare(a, b));
    transactions
}

/// `select_tab` followed by `sort_for_display`.
pub fn display_list(all: &[Transaction], tab: Tab, order: DisplayOrder) -> Vec<Transaction> {
    sort_for_display(select_tab(all, tab), order)
}
