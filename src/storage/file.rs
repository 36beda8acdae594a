use crate::storage::{validate_key, Storage};
use crate::{utils, Result};
use std::path::PathBuf;
use tracing::trace;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a hidden temp file first and are then renamed over the destination, so a reader
/// never sees a partially written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates `dir` if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        utils::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn temp_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!(".{key}.json.tmp")))
    }
}

#[async_trait::async_trait]
impl Storage for FileStorage {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        trace!("get {key} from {}", path.display());
        utils::read_optional(&path).await
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        let temp = self.temp_path(key)?;
        trace!("set {key} at {}", path.display());
        utils::write(&temp, value).await?;
        utils::rename(&temp, &path).await
    }
}
