//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::ledger::LedgerSettings;
use crate::storage::Backend;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up an expense tracker home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment using the file backend and default settings.
    pub async fn new() -> Self {
        Self::with(Backend::File, LedgerSettings::default()).await
    }

    pub async fn with(backend: Backend, settings: LedgerSettings) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expense-tracker");
        let config = Config::create(&root, backend, settings).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}
