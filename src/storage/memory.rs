//! Implements `Storage` entirely in memory.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole ledger
//! can be driven top-to-bottom without touching the disk. It can also be told to fail, which is
//! how the write-retry and load-warning paths are exercised.

use crate::storage::Storage;
use crate::Result;
use anyhow::bail;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

#[derive(Debug, Default)]
struct Inner {
    data: HashMap<String, String>,
    failing_writes: u32,
    failing_keys: HashSet<String>,
    failing_reads: bool,
    writes: u32,
}

/// An in-memory `Storage`. Clones share the same underlying map, so a test can keep a handle
/// while the ledger owns another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        {
            let mut inner = storage.lock();
            for (k, v) in entries {
                inner.data.insert(k.into(), v.into());
            }
        }
        storage
    }

    /// The next `count` calls to `set` fail without changing anything.
    pub fn fail_next_writes(&self, count: u32) {
        self.lock().failing_writes = count;
    }

    /// Every write to `key` fails from now on.
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.lock().failing_keys.insert(key.into());
    }

    /// While `fail` is true every call to `get` fails.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().failing_reads = fail;
    }

    /// The value currently held under `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().data.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().data.insert(key.into(), value.into());
    }

    /// How many calls to `set` have succeeded.
    pub fn successful_writes(&self) -> u32 {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        trace!("get {key} from memory");
        let inner = self.lock();
        if inner.failing_reads {
            bail!("Simulated read failure for '{key}'");
        }
        Ok(inner.data.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        trace!("set {key} in memory");
        let mut inner = self.lock();
        if inner.failing_writes > 0 {
            inner.failing_writes -= 1;
            bail!("Simulated write failure for '{key}'");
        }
        if inner.failing_keys.contains(key) {
            bail!("Simulated write failure for '{key}'");
        }
        inner.data.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
