//! Repository layer
//!
//! Bucket-scoped byte-key/byte-value stores. Repositories know nothing
//! about pipelines; they move opaque bytes in and out of a backend.
//!
//! All repositories are trait-based so services can be tested against an
//! in-memory backend.

mod fs;
mod memory;

use thiserror::Error;

pub use fs::FsKvStore;
pub use memory::MemoryKvStore;

/// Result type alias for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Errors raised by a key-value backend
#[derive(Debug, Error)]
pub enum KvError {
    /// Underlying I/O failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this backend
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

/// Bucket-scoped key-value store
///
/// Every call is a single synchronous request. A `put` replaces the whole
/// value atomically and `delete` of an absent key succeeds. The empty key
/// is never valid: every operation rejects it with [`KvError::InvalidKey`].
pub trait KvStore: Send + Sync {
    /// Fetches the value stored under `key`
    ///
    /// # Returns
    /// `None` when nothing is stored, which is distinct from an empty value.
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value
    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removes the value under `key`, if any
    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()>;
}

/// Rejects keys no backend may store
pub(crate) fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::InvalidKey("empty key".to_string()));
    }
    Ok(())
}
