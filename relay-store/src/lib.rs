//! Relay Store
//!
//! Versioned, persisted pipeline configuration.
//!
//! Architecture:
//! - Configuration: backend selection from environment or defaults
//! - Repositories: bucket-scoped key-value backends (memory, filesystem)
//! - Services: the pipeline configuration lifecycle (create/get/update/delete)
//!   plus the identity and clock seams it stamps records with

pub mod config;
pub mod repository;
pub mod service;
pub mod telemetry;

pub use config::{Backend, StoreConfig};
pub use repository::{FsKvStore, KvError, KvStore, MemoryKvStore};
pub use service::{
    Clock, IdGenerator, PIPELINE_CONFIG_BUCKET, PipelineConfigError, PipelineConfigStore,
    SystemClock, UuidGenerator,
};
