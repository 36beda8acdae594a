use crate::commands::Out;
use crate::ledger::LedgerSettings;
use crate::storage::Backend;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories, and an initial `config.json` recording
/// `backend` and `settings`.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/expense-tracker`
/// - `backend` - Where the ledger will be stored
/// - `settings` - How the ledger behaves once opened
///
/// # Errors
/// - Returns an error if the directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(home: &Path, backend: Backend, settings: LedgerSettings) -> Result<Out<()>> {
    let config = Config::create(home, backend, settings)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the expense tracker directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, Backend::Sqlite, LedgerSettings::default())
            .await
            .unwrap();
        assert!(out.message().starts_with("Successfully created"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.backend(), Backend::Sqlite);
        assert!(init(&home, Backend::File, LedgerSettings::default())
            .await
            .is_err());
    }
}
