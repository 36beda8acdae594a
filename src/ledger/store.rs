//! Reads and writes the ledger, and its two companion slots, through a `Storage`.

use crate::error::PersistenceError;
use crate::model::Transaction;
use crate::storage::{Storage, APP_HAS_LAUNCHED_KEY, TRANSACTIONS_KEY, TRANSACTION_COUNTER_KEY};
use crate::Result;
use anyhow::Context;
use std::time::Duration;
use tracing::{debug, trace, warn};

const RETRY_DELAY: Duration = Duration::from_millis(25);

/// Why `load` came back empty, along with whatever raw text was found so that it can be saved
/// before a later write replaces it.
#[derive(Debug)]
pub struct LoadProblem {
    pub error: PersistenceError,
    pub raw: Option<String>,
}

/// The result of a soft load: the transactions, plus the problem if there was one. When there is
/// a problem, `transactions` is empty.
#[derive(Debug, Default)]
pub struct Loaded {
    pub transactions: Vec<Transaction>,
    pub problem: Option<LoadProblem>,
}

/// The persisted ledger. Holds the only handle to the backing `Storage`.
pub struct LedgerStore {
    storage: Box<dyn Storage>,
    write_retries: u32,
}

impl LedgerStore {
    /// `write_retries` is how many more times a failed write is attempted before giving up.
    pub fn new(storage: Box<dyn Storage>, write_retries: u32) -> Self {
        Self {
            storage,
            write_retries,
        }
    }

    /// Loads the ledger, failing on a backend error or malformed data. A missing or blank slot is
    /// an empty ledger.
    pub async fn try_load(&mut self) -> std::result::Result<Vec<Transaction>, LoadProblem> {
        let raw = self
            .storage
            .get(TRANSACTIONS_KEY)
            .await
            .map_err(|source| LoadProblem {
                error: PersistenceError::Load {
                    key: TRANSACTIONS_KEY.to_string(),
                    source,
                },
                raw: None,
            })?;

        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                debug!("No stored transactions, starting with an empty ledger");
                return Ok(Vec::new());
            }
        };

        match serde_json::from_str::<Vec<Transaction>>(&raw) {
            Ok(transactions) => {
                debug!("Loaded {} transactions", transactions.len());
                Ok(transactions)
            }
            Err(source) => Err(LoadProblem {
                error: PersistenceError::Malformed {
                    key: TRANSACTIONS_KEY.to_string(),
                    source,
                },
                raw: Some(raw),
            }),
        }
    }

    /// Loads the ledger without failing. Any problem leaves the ledger empty and is reported
    /// alongside it.
    pub async fn load(&mut self) -> Loaded {
        match self.try_load().await {
            Ok(transactions) => Loaded {
                transactions,
                problem: None,
            },
            Err(problem) => {
                warn!("Treating the ledger as empty: {}", problem.error.describe());
                Loaded {
                    transactions: Vec::new(),
                    problem: Some(problem),
                }
            }
        }
    }

    /// Writes `existing` followed by `new` as a single value and returns the combined ledger.
    ///
    /// A failed write is attempted again up to `write_retries` times. If every attempt fails,
    /// nothing is returned for the caller to adopt.
    pub async fn append_and_persist(
        &mut self,
        existing: &[Transaction],
        new: Transaction,
    ) -> std::result::Result<Vec<Transaction>, PersistenceError> {
        let mut combined = Vec::with_capacity(existing.len() + 1);
        combined.extend_from_slice(existing);
        combined.push(new);

        let json = serde_json::to_string(&combined).map_err(|e| PersistenceError::Write {
            key: TRANSACTIONS_KEY.to_string(),
            attempts: 0,
            source: e.into(),
        })?;

        self.set_with_retries(TRANSACTIONS_KEY, &json).await?;
        Ok(combined)
    }

    async fn set_with_retries(
        &mut self,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), PersistenceError> {
        let attempts = self.write_retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            trace!("Writing '{key}', attempt {attempt} of {attempts}");
            match self.storage.set(key, value).await {
                Ok(()) => return Ok(()),
                Err(source) if attempt >= attempts => {
                    return Err(PersistenceError::Write {
                        key: key.to_string(),
                        attempts,
                        source,
                    })
                }
                Err(e) => {
                    warn!("Write of '{key}' failed (attempt {attempt} of {attempts}): {e:#}");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// The last id issued by the counter strategy. A missing, unreadable, or garbled counter is
    /// `None`: the next id is still safe because it is also derived from the ledger itself.
    pub async fn load_counter(&mut self) -> Option<u64> {
        let raw = match self.storage.get(TRANSACTION_COUNTER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Unable to read the transaction counter: {e:#}");
                return None;
            }
        };
        match raw.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unreadable transaction counter '{raw}'");
                None
            }
        }
    }

    pub async fn save_counter(&mut self, value: u64) -> Result<()> {
        self.set_with_retries(TRANSACTION_COUNTER_KEY, &value.to_string())
            .await
            .context("Unable to save the transaction counter")
    }

    /// Whether onboarding has been completed. A read failure counts as a first launch.
    pub async fn has_launched(&mut self) -> bool {
        match self.storage.get(APP_HAS_LAUNCHED_KEY).await {
            Ok(flag) => flag.is_some(),
            Err(e) => {
                warn!("Unable to read the launch flag: {e:#}");
                false
            }
        }
    }

    pub async fn mark_launched(&mut self) -> Result<()> {
        self.set_with_retries(APP_HAS_LAUNCHED_KEY, "true")
            .await
            .context("Unable to save the launch flag")
    }
}
