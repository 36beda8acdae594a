//! Transaction identifier assignment.

use crate::model::Transaction;
use crate::Result;
use anyhow::{bail, ensure};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

const UUID_ATTEMPTS: usize = 3;

/// How fresh transaction ids are produced.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Decimal integers counting up from 1, backed by the persisted `transactionCounter`.
    #[default]
    Counter,
    /// Random v4 UUIDs.
    Uuid,
}

serde_plain::derive_display_from_serialize!(IdStrategy);
serde_plain::derive_fromstr_from_deserialize!(IdStrategy);

/// A freshly issued id. `counter` is the value to persist as the new `transactionCounter`, when
/// the strategy keeps one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IssuedId {
    pub id: String,
    pub counter: Option<u64>,
}

/// The next counter value: one more than the larger of the stored counter and the largest
/// numeric id already in the ledger.
///
/// Taking the ledger into account means that ledgers written before the counter existed, and
/// counters whose last write was lost, still never hand out an id twice.
pub fn next_counter_value(stored: Option<u64>, existing: &[Transaction]) -> u64 {
    let largest = existing
        .iter()
        .filter_map(|t| t.id().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    stored.unwrap_or(0).max(largest).saturating_add(1)
}

/// Issues an id that no transaction in `existing` already has.
pub fn issue(
    strategy: IdStrategy,
    stored_counter: Option<u64>,
    existing: &[Transaction],
) -> Result<IssuedId> {
    let taken: HashSet<&str> = existing.iter().map(|t| t.id()).collect();
    match strategy {
        IdStrategy::Counter => {
            let value = next_counter_value(stored_counter, existing);
            let id = value.to_string();
            ensure!(
                !taken.contains(id.as_str()),
                "Transaction id {id} is already in use"
            );
            Ok(IssuedId {
                id,
                counter: Some(value),
            })
        }
        IdStrategy::Uuid => {
            for _ in 0..UUID_ATTEMPTS {
                let id = uuid::Uuid::new_v4().to_string();
                if !taken.contains(id.as_str()) {
                    return Ok(IssuedId { id, counter: None });
                }
                warn!("Generated a UUID that is already in use, trying again");
            }
            bail!("Unable to generate an unused transaction id after {UUID_ATTEMPTS} attempts")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, PaymentType};
    use chrono::Utc;

    fn with_ids(ids: &[&str]) -> Vec<Transaction> {
        ids.iter()
            .map(|id| {
                Transaction::new(
                    *id,
                    Amount::from(1),
                    Category::Food,
                    PaymentType::Cash,
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_counter_starts_at_one() {
        let issued = issue(IdStrategy::Counter, None, &[]).unwrap();
        assert_eq!(issued.id, "1");
        assert_eq!(issued.counter, Some(1));
    }

    #[test]
    fn test_counter_follows_stored_value() {
        let issued = issue(IdStrategy::Counter, Some(41), &with_ids(&["1", "2"])).unwrap();
        assert_eq!(issued.id, "42");
    }

    #[test]
    fn test_counter_skips_past_legacy_ids() {
        // A ledger written without a counter, or whose counter write was lost
        let existing = with_ids(&["1", "2", "10"]);
        assert_eq!(next_counter_value(None, &existing), 11);
        assert_eq!(next_counter_value(Some(3), &existing), 11);
    }

    #[test]
    fn test_counter_does_not_depend_on_length() {
        // Two records, but the next id must not be "3" when "3" is taken
        let existing = with_ids(&["3", "abc"]);
        let issued = issue(IdStrategy::Counter, None, &existing).unwrap();
        assert_eq!(issued.id, "4");
    }

    #[test]
    fn test_counter_with_padded_ids() {
        let existing = with_ids(&["005", "6"]);
        let issued = issue(IdStrategy::Counter, Some(4), &existing).unwrap();
        assert_eq!(issued.id, "7");
    }

    #[test]
    fn test_counter_exhausted() {
        let max = u64::MAX.to_string();
        let existing = with_ids(&[max.as_str()]);
        assert!(issue(IdStrategy::Counter, None, &existing).is_err());
    }

    #[test]
    fn test_uuid_ids() {
        let existing = with_ids(&["1"]);
        let a = issue(IdStrategy::Uuid, None, &existing).unwrap();
        let b = issue(IdStrategy::Uuid, None, &existing).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 36);
        assert_eq!(a.counter, None);
    }
}
