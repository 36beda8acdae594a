//! Backup management for ledger data that is about to be lost.

use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for copies of a stored ledger that could not be parsed.
pub const CORRUPT_LEDGER: &str = "corrupt-ledger";

const JSON: &str = ".json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `contents` verbatim as a backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_raw(&self, prefix: &str, contents: &str) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}{JSON}");
        let path = self.backups_dir.join(&filename);

        utils::write(&path, contents).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let pattern_start = format!("{prefix}.{date}-");
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if name.starts_with(&pattern_start) {
                if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                    max_seq = max_seq.max(seq);
                }
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();

            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{prefix}.{date}-");
    let remainder = filename.strip_prefix(&expected_start)?;
    let seq_str = remainder.strip_suffix(JSON)?;
    seq_str.parse().ok()
}

/// Checks if a filename is a JSON backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerSettings;
    use crate::storage::Backend;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("corrupt-ledger.2025-12-14-001.json", CORRUPT_LEDGER, "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("corrupt-ledger.2025-12-14-042.json", CORRUPT_LEDGER, "2025-12-14"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("ledger.2025-12-14-001.json", CORRUPT_LEDGER, "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("corrupt-ledger.2025-12-13-001.json", CORRUPT_LEDGER, "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("corrupt-ledger.2025-12-14-001.json", CORRUPT_LEDGER));
        assert!(!is_backup_file("corrupt-ledger.2025-12-14-001.txt", CORRUPT_LEDGER));
        assert!(!is_backup_file("other.2025-12-14-001.json", CORRUPT_LEDGER));
    }

    #[tokio::test]
    async fn test_save_raw_and_rotate() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), Backend::File, LedgerSettings::default())
            .await
            .unwrap();
        let backup = config.backup();

        let mut paths = Vec::new();
        for i in 0..7 {
            let path = backup
                .save_raw(CORRUPT_LEDGER, &format!("garbage {i}"))
                .await
                .unwrap();
            paths.push(path);
        }

        let first = paths[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(first.starts_with(&format!("{CORRUPT_LEDGER}.{}-001", today())));
        assert_eq!(
            utils::read(&paths[6]).await.unwrap(),
            "garbage 6".to_string()
        );

        let mut remaining = 0;
        let mut entries = utils::read_dir(config.backups()).await.unwrap();
        while let Some(_entry) = entries.next_entry().await.unwrap() {
            remaining += 1;
        }
        assert_eq!(remaining, 5);
        assert!(!paths[0].exists());
        assert!(!paths[1].exists());
        assert!(paths[2].exists());
    }
}
