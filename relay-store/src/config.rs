//! Store configuration
//!
//! Selects the key-value backend and where it keeps its data.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::repository::{FsKvStore, KvStore, MemoryKvStore};

/// Key-value backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Process-local map, lost on exit
    Memory,
    /// One file per value under `data_dir`
    Fs,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Backend::Memory),
            "fs" | "file" | "filesystem" => Ok(Backend::Fs),
            other => anyhow::bail!("unknown store backend: {other}"),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Memory => write!(f, "memory"),
            Backend::Fs => write!(f, "fs"),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,

    /// Root directory for the filesystem backend
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(backend: Backend, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            data_dir: data_dir.into(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RELAY_STORE_BACKEND (optional, `memory` or `fs`, default: fs)
    /// - RELAY_DATA_DIR (optional, default: ./data)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let backend = match var("RELAY_STORE_BACKEND") {
            Some(raw) => raw
                .parse::<Backend>()
                .context("invalid RELAY_STORE_BACKEND environment variable")?,
            None => Backend::Fs,
        };

        let data_dir = var("RELAY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        Ok(Self { backend, data_dir })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend == Backend::Fs && self.data_dir.as_os_str().is_empty() {
            anyhow::bail!("data_dir cannot be empty for the fs backend");
        }
        Ok(())
    }

    /// Builds the configured backend
    pub fn open(&self) -> anyhow::Result<Arc<dyn KvStore>> {
        self.validate()?;
        let store: Arc<dyn KvStore> = match self.backend {
            Backend::Memory => Arc::new(MemoryKvStore::new()),
            Backend::Fs => Arc::new(FsKvStore::open(&self.data_dir).with_context(|| {
                format!("failed to open store at {}", self.data_dir.display())
            })?),
        };
        tracing::info!("Opened {} store", self.backend);
        Ok(store)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Backend::Fs, "./data")
    }
}
