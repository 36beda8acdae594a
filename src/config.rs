//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSE_TRACKER_HOME/config.json` and says which storage
//! backend holds the ledger, how new transaction ids are produced, how the list is ordered, and
//! how many backups to keep.

use crate::backup::Backup;
use crate::ledger::{DisplayOrder, IdStrategy, LedgerSettings};
use crate::storage::Backend;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expense-tracker";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const WRITE_RETRIES: u32 = 1;
const BACKUPS: &str = ".backups";
const STORE: &str = "store";
const CONFIG_JSON: &str = "config.json";
const LEDGER_SQLITE: &str = "ledger.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSE_TRACKER_HOME` and from there it loads `config.json`. It provides paths to
/// the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    store: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories, and an initial `config.json`.
    ///
    /// # Errors
    /// - Returns an error if `dir` already holds a `config.json`.
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        backend: Backend,
        settings: LedgerSettings,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::create_dir_all(&maybe_relative)
            .await
            .context("Unable to create the expense tracker home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "There is already a config file at '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::create_dir_all(&backups).await?;
        let store = root.join(STORE);
        utils::create_dir_all(&store).await?;

        let config_file = ConfigFile {
            backend,
            id_strategy: settings.id_strategy,
            display_order: settings.display_order,
            write_retries: settings.write_retries,
            whole_units_only: settings.whole_units_only,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            store,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and store directories exist
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expense tracker home directory is missing, run 'expense init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            store: root.join(STORE),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.store.is_dir() {
            bail!(
                "The store directory is missing '{}'",
                config.store.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// Where the file backend keeps its files, and where the SQLite database lives.
    pub fn store_dir(&self) -> &Path {
        &self.store
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.store.join(LEDGER_SQLITE)
    }

    pub fn backend(&self) -> Backend {
        self.config_file.backend
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The settings a `LedgerSession` over this home directory should use.
    pub fn settings(&self) -> LedgerSettings {
        LedgerSettings {
            id_strategy: self.config_file.id_strategy,
            display_order: self.config_file.display_order,
            write_retries: self.config_file.write_retries,
            whole_units_only: self.config_file.whole_units_only,
        }
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expense-tracker",
///   "config_version": 1,
///   "backend": "file",
///   "id_strategy": "counter",
///   "display_order": "id_lexicographic",
///   "write_retries": 1,
///   "whole_units_only": true,
///   "backup_copies": 5
/// }
/// ```
///
/// Only `app_name` and `config_version` are required; everything else has a default.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expense-tracker"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Which storage backend holds the ledger
    #[serde(default)]
    backend: Backend,

    /// How new transaction ids are produced
    #[serde(default)]
    id_strategy: IdStrategy,

    /// How the transaction list is ordered
    #[serde(default)]
    display_order: DisplayOrder,

    /// How many more times a failed write is attempted
    #[serde(default = "default_write_retries")]
    write_retries: u32,

    /// Whether amounts are truncated to whole units when entered
    #[serde(default = "default_whole_units_only")]
    whole_units_only: bool,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,
}

fn default_write_retries() -> u32 {
    WRITE_RETRIES
}

fn default_whole_units_only() -> bool {
    true
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backend: Backend::default(),
            id_strategy: IdStrategy::default(),
            display_order: DisplayOrder::default(),
            write_retries: WRITE_RETRIES,
            whole_units_only: true,
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not ours
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );
        anyhow::ensure!(
            config.backup_copies > 0,
            "backup_copies must be at least 1"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
