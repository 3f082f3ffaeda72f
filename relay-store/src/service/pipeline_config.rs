//! Pipeline configuration service
//!
//! Lifecycle of [`PipelineConfig`] records: create, get, update, delete.
//! Each record is stored as a complete JSON snapshot under its id in a
//! single bucket; there are no partial updates and no tombstones.

use std::sync::Arc;

use relay_core::domain::pipeline::PipelineConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::identity::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::repository::{KvError, KvStore};

/// Bucket holding every pipeline configuration
pub const PIPELINE_CONFIG_BUCKET: &str = "PipelineConfig";

/// Service error type
#[derive(Debug, Error)]
pub enum PipelineConfigError {
    /// Caller passed an unusable argument, e.g. an empty id
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Nothing is stored under the id
    #[error("pipeline config not found: {0}")]
    NotFound(String),

    /// The config could not be serialized
    #[error("failed to encode pipeline config: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Stored bytes are not a valid pipeline config
    #[error("failed to decode pipeline config {id}: {source}")]
    Decoding {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key-value backend failed
    #[error("storage error: {0}")]
    Storage(#[from] KvError),
}

impl PipelineConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Corrupt data, as opposed to absent data
    pub fn is_decoding(&self) -> bool {
        matches!(self, Self::Decoding { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineConfigError>;

/// Persists pipeline configurations through an injected key-value store
///
/// Holds no locks of its own. Concurrent updates of the same id race and
/// the last write wins.
#[derive(Clone)]
pub struct PipelineConfigStore {
    kv: Arc<dyn KvStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl PipelineConfigStore {
    pub fn new(kv: Arc<dyn KvStore>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, ids, clock }
    }

    /// Random UUIDs and the wall clock
    pub fn with_defaults(kv: Arc<dyn KvStore>) -> Self {
        Self::new(kv, Arc::new(UuidGenerator), Arc::new(SystemClock))
    }

    /// Get a pipeline config by ID
    pub fn get(&self, id: &str) -> Result<PipelineConfig> {
        if id.is_empty() {
            return Err(PipelineConfigError::InvalidArgument(
                "pipeline config id cannot be empty".to_string(),
            ));
        }

        let bytes = self
            .kv
            .get(PIPELINE_CONFIG_BUCKET, id.as_bytes())?
            .ok_or_else(|| PipelineConfigError::NotFound(id.to_string()))?;

        let cfg: PipelineConfig = serde_json::from_slice(&bytes).map_err(|source| {
            warn!("Stored pipeline config {} is unreadable: {}", id, source);
            PipelineConfigError::Decoding {
                id: id.to_string(),
                source,
            }
        })?;

        debug!("Loaded pipeline config {}", id);

        Ok(cfg)
    }

    /// Create a new pipeline config
    ///
    /// Assigns a fresh id and stamps `created` and `updated` with the same
    /// instant. The stamps are written back into `cfg` so the caller sees
    /// the assigned identity.
    ///
    /// # Returns
    /// The new id
    pub fn create(&self, cfg: &mut PipelineConfig) -> Result<String> {
        let now = self.clock.now();
        let id = self.ids.generate();

        let mut stamped = cfg.clone();
        stamped.id = id.clone();
        stamped.created = Some(now);
        stamped.updated = Some(now);

        self.write(&stamped)?;
        *cfg = stamped;

        info!("Pipeline config created: {} ({})", cfg.name, id);

        Ok(id)
    }

    /// Replace the pipeline config stored under `id`
    ///
    /// Forces `cfg.id` to `id` and stamps `updated`. Everything else,
    /// `created` included, is taken from `cfg` as given; the previous
    /// record is not read.
    pub fn update(&self, id: &str, cfg: &mut PipelineConfig) -> Result<()> {
        let mut stamped = cfg.clone();
        stamped.id = id.to_string();
        stamped.updated = Some(self.clock.now());

        self.write(&stamped)?;
        *cfg = stamped;

        info!("Pipeline config updated: {} ({})", cfg.name, id);

        Ok(())
    }

    /// Delete a pipeline config
    ///
    /// Deleting an id that was never created is not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.kv.delete(PIPELINE_CONFIG_BUCKET, id.as_bytes())?;

        info!("Pipeline config deleted: {}", id);

        Ok(())
    }

    fn write(&self, cfg: &PipelineConfig) -> Result<()> {
        let bytes = serde_json::to_vec(cfg).map_err(PipelineConfigError::Encoding)?;
        self.kv.put(PIPELINE_CONFIG_BUCKET, cfg.id.as_bytes(), &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FsKvStore, MemoryKvStore};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use relay_core::domain::pipeline::JointConfig;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("pc-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Advances one second on every reading
    struct SteppingClock(Mutex<DateTime<Utc>>);

    impl SteppingClock {
        fn starting_at(t: DateTime<Utc>) -> Self {
            Self(Mutex::new(t))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut t = self.0.lock().unwrap();
            let now = *t;
            *t = now + Duration::seconds(1);
            now
        }
    }

    /// Reads succeed (always empty), writes fail
    struct BrokenKv;

    impl KvStore for BrokenKv {
        fn get(&self, _: &str, _: &[u8]) -> crate::repository::Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn put(&self, _: &str, _: &[u8], _: &[u8]) -> crate::repository::Result<()> {
            Err(std::io::Error::other("disk full").into())
        }

        fn delete(&self, _: &str, _: &[u8]) -> crate::repository::Result<()> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn store_with(kv: Arc<dyn KvStore>) -> PipelineConfigStore {
        PipelineConfigStore::new(
            kv,
            Arc::new(SequentialIds(AtomicUsize::new(0))),
            Arc::new(SteppingClock::starting_at(epoch())),
        )
    }

    fn site_crawl() -> PipelineConfig {
        PipelineConfig::new("site-crawl")
            .with_process(JointConfig::new("filter").with_parameter("regex", ".*"))
            .with_tag("crawler")
    }

    #[test]
    fn test_get_empty_id_is_invalid() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        store.create(&mut site_crawl()).unwrap();

        assert!(matches!(
            store.get(""),
            Err(PipelineConfigError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let err = store.get("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_corrupt_is_decoding_error() {
        let kv = MemoryKvStore::new();
        kv.put(PIPELINE_CONFIG_BUCKET, b"bad", b"{not json").unwrap();
        kv.put(PIPELINE_CONFIG_BUCKET, b"empty", b"").unwrap();
        let store = store_with(Arc::new(kv));

        let err = store.get("bad").unwrap_err();
        assert!(err.is_decoding());
        assert!(!err.is_not_found());
        assert!(store.get("empty").unwrap_err().is_decoding());
    }

    #[test]
    fn test_create_stamps_identity_and_time() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let mut cfg = site_crawl();
        cfg.id = "caller-chosen".to_string();

        let id = store.create(&mut cfg).unwrap();

        assert_eq!(id, "pc-1");
        assert_eq!(cfg.id, id);
        assert_eq!(cfg.created, Some(epoch()));
        assert_eq!(cfg.created, cfg.updated);

        let loaded = store.get(&id).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.process, site_crawl().process);
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let a = store.create(&mut site_crawl()).unwrap();
        let b = store.create(&mut site_crawl()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_replaces_and_advances_updated() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let mut cfg = site_crawl();
        let id = store.create(&mut cfg).unwrap();
        let first_updated = cfg.updated;

        let mut changed = store.get(&id).unwrap();
        changed.process[0].enabled = false;
        changed.tags.clear();
        changed.id = "ignored".to_string();
        store.update(&id, &mut changed).unwrap();

        let loaded = store.get(&id).unwrap();
        assert_eq!(loaded.id, id);
        assert!(!loaded.process[0].enabled);
        assert!(loaded.tags.is_empty());
        assert_eq!(loaded.created, cfg.created);
        assert!(loaded.updated > first_updated);
        assert_eq!(loaded, changed);
    }

    #[test]
    fn test_update_does_not_preserve_created_on_its_own() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let id = store.create(&mut site_crawl()).unwrap();

        let mut replacement = PipelineConfig::new("rewritten");
        store.update(&id, &mut replacement).unwrap();

        let loaded = store.get(&id).unwrap();
        assert_eq!(loaded.name, "rewritten");
        assert!(loaded.created.is_none());
        assert!(loaded.updated.is_some());
    }

    #[test]
    fn test_update_empty_id_is_storage_error() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let mut cfg = site_crawl();

        assert!(matches!(
            store.update("", &mut cfg),
            Err(PipelineConfigError::Storage(KvError::InvalidKey(_)))
        ));
        assert!(cfg.id.is_empty());
        assert!(matches!(
            store.delete(""),
            Err(PipelineConfigError::Storage(KvError::InvalidKey(_)))
        ));
    }

    #[test]
    fn test_long_id_on_disk_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = store_with(Arc::new(FsKvStore::open(dir.path()).unwrap()));
        store.create(&mut site_crawl()).unwrap();
        let long_id = "x".repeat(200);

        assert!(store.get(&long_id).unwrap_err().is_not_found());
        assert!(store.delete(&long_id).is_ok());

        let mut cfg = site_crawl();
        store.update(&long_id, &mut cfg).unwrap();
        assert_eq!(store.get(&long_id).unwrap(), cfg);
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        let id = store.create(&mut site_crawl()).unwrap();

        store.delete(&id).unwrap();

        assert!(store.get(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_unknown_id_succeeds() {
        let store = store_with(Arc::new(MemoryKvStore::new()));
        assert!(store.delete("never-created").is_ok());
    }

    #[test]
    fn test_storage_failures_are_reported() {
        let store = store_with(Arc::new(BrokenKv));
        let mut cfg = site_crawl();

        assert!(matches!(
            store.create(&mut cfg),
            Err(PipelineConfigError::Storage(_))
        ));
        // a failed create leaves the caller's value unstamped
        assert!(cfg.id.is_empty());
        assert!(cfg.created.is_none());

        assert!(matches!(
            store.update("x", &mut cfg),
            Err(PipelineConfigError::Storage(_))
        ));
        assert!(matches!(
            store.delete("x"),
            Err(PipelineConfigError::Storage(_))
        ));
    }

    #[test]
    fn test_site_crawl_lifecycle_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let kv = FsKvStore::open(dir.path()).unwrap();
        let store = PipelineConfigStore::with_defaults(Arc::new(kv));

        let fetch = JointConfig::new("fetch")
            .with_parameter("limits", json!({ "depth": 2, "hosts": ["a", "b"] }));
        let mut cfg = site_crawl().with_process(fetch);
        let id = store.create(&mut cfg).unwrap();
        assert!(!id.is_empty());

        let mut loaded = store.get(&id).unwrap();
        assert_eq!(loaded.process, cfg.process);

        loaded.process[0].enabled = false;
        store.update(&id, &mut loaded).unwrap();

        let after = store.get(&id).unwrap();
        assert!(!after.process[0].enabled);
        assert!(after.updated >= cfg.updated);
        assert_eq!(after.created, cfg.created);

        store.delete(&id).unwrap();
        assert!(store.get(&id).unwrap_err().is_not_found());
    }
}
