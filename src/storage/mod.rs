//! The key-value seam between the ledger and whatever holds its bytes.
//!
//! The ledger only ever needs two operations on named string slots: read one, replace one. Each
//! backend implements `Storage` and is used as a `Box<dyn Storage>`, so the rest of the program
//! does not care whether the bytes end up in files, in SQLite, or in memory.

mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The slot holding the JSON array of transactions.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// The slot holding the onboarding flag.
pub const APP_HAS_LAUNCHED_KEY: &str = "appHasLaunched";
/// The slot holding the last id issued by the counter strategy.
pub const TRANSACTION_COUNTER_KEY: &str = "transactionCounter";

/// An asynchronous string key-value store.
///
/// Implementations must make `set` atomic per key: a later `get` sees either the old value or
/// the new one, never a mix.
#[async_trait::async_trait]
pub trait Storage: Send {
    /// Returns the value stored under `key`, or `None` if nothing has been stored there.
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Which `Storage` implementation a home directory uses.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// One JSON file per key in `$EXPENSE_TRACKER_HOME/store`.
    #[default]
    File,
    /// A single SQLite database at `$EXPENSE_TRACKER_HOME/store/ledger.sqlite`.
    Sqlite,
}

serde_plain::derive_display_from_serialize!(Backend);
serde_plain::derive_fromstr_from_deserialize!(Backend);

/// Opens the backend that `config` names.
pub async fn open(config: &Config) -> Result<Box<dyn Storage>> {
    debug!("Opening the {} storage backend", config.backend());
    let storage: Box<dyn Storage> = match config.backend() {
        Backend::File => Box::new(FileStorage::new(config.store_dir()).await?),
        Backend::Sqlite => Box::new(SqliteStorage::open(config.sqlite_path()).await?),
    };
    Ok(storage)
}

/// Rejects keys that could not safely be used as a file name or are otherwise unexpected.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    anyhow::ensure!(
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        "Invalid storage key '{key}'"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_key() {
        validate_key(TRANSACTIONS_KEY).unwrap();
        validate_key(APP_HAS_LAUNCHED_KEY).unwrap();
        validate_key(TRANSACTION_COUNTER_KEY).unwrap();
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a b").is_err());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::Sqlite.to_string(), "sqlite");
        assert_eq!(Backend::from_str("file").unwrap(), Backend::File);
    }
}
