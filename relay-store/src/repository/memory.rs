//! In-memory key-value store
//!
//! Keeps every bucket in a single process-local map. Nothing survives a
//! restart; intended for tests and for callers embedding the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KvError, KvStore, Result, check_key};

type Buckets = HashMap<(String, Vec<u8>), Vec<u8>>;

/// In-memory implementation of KvStore
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<Buckets>>,
}

impl MemoryKvStore {
    /// Creates an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buckets>> {
        self.entries.lock().map_err(|_| KvError::Poisoned)
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let entries = self.lock()?;
        Ok(entries.get(&(bucket.to_string(), key.to_vec())).cloned())
    }

    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        check_key(key)?;
        let mut entries = self.lock()?;
        entries.insert((bucket.to_string(), key.to_vec()), value.to_vec());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        check_key(key)?;
        let mut entries = self.lock()?;
        entries.remove(&(bucket.to_string(), key.to_vec()));
        Ok(())
    }
}
