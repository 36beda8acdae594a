//! Error types.
//!
//! Plumbing errors (files, config, the CLI) are `anyhow::Error`. The ledger's own failure modes
//! are typed so that callers can tell a rejected draft from a failed write.

use chrono::{DateTime, Utc};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Why a draft was not accepted. None of these mutate the ledger.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("Invalid amount '{text}': please enter an amount greater than zero")]
    InvalidAmount { text: String },

    #[error("Unknown category '{0}'")]
    InvalidCategory(String),

    #[error("Unknown payment type '{0}'")]
    InvalidPaymentType(String),

    #[error("The date {date} is in the future")]
    FutureDate { date: DateTime<Utc> },
}

/// A failure talking to the backing store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backing store could not be read.
    #[error("Unable to read '{key}' from the backing store")]
    Load {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The backing store returned something that is not a ledger.
    #[error("The value stored under '{key}' is malformed")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The write did not succeed, retries included.
    #[error("Unable to write '{key}' to the backing store after {attempts} attempt(s)")]
    Write {
        key: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
}

impl PersistenceError {
    pub fn is_write(&self) -> bool {
        matches!(self, PersistenceError::Write { .. })
    }

    /// True when the store could not be read at all, so nothing is known about what it holds.
    pub fn is_load(&self) -> bool {
        matches!(self, PersistenceError::Load { .. })
    }

    /// This error followed by each of its causes, separated by `": "`.
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

/// The outcome of a failed submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// No unused id could be produced for the new transaction.
    #[error("Unable to assign an id to the new transaction")]
    Id(#[source] anyhow::Error),
}

impl SubmitError {
    /// True when the draft was rejected as `InvalidAmount`.
    pub fn is_invalid_amount(&self) -> bool {
        matches!(self, SubmitError::Entry(EntryError::InvalidAmount { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_describe_includes_causes() {
        let error = PersistenceError::Write {
            key: "transactions".to_string(),
            attempts: 2,
            source: anyhow!("disk full"),
        };
        assert!(error.is_write());
        assert!(!error.is_load());
        assert_eq!(
            error.describe(),
            "Unable to write 'transactions' to the backing store after 2 attempt(s): disk full"
        );
    }

    #[test]
    fn test_submit_error_classification() {
        let rejected = SubmitError::from(EntryError::InvalidAmount {
            text: "0".to_string(),
        });
        assert!(rejected.is_invalid_amount());
        let failed = SubmitError::from(PersistenceError::Write {
            key: "transactions".to_string(),
            attempts: 1,
            source: anyhow!("nope"),
        });
        assert!(!failed.is_invalid_amount());
    }
}
