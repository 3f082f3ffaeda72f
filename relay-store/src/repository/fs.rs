//! Filesystem key-value store
//!
//! Layout: `<root>/<bucket>/<hex(key)>`, one file per value. Keys whose hex
//! form would not fit a file name are stored as `sha256-<hex(sha256(key))>`.
//! Writes go to a synced temp file in the same directory and are renamed
//! over the target, so a reader sees either the old value or the new one.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use super::{KvError, KvStore, Result, check_key};

/// Longest hex file name used verbatim; leaves room for the temp suffix
/// under the usual 255-byte file name limit.
const MAX_HEX_NAME: usize = 200;

/// Filesystem implementation of KvStore
#[derive(Debug, Clone)]
pub struct FsKvStore {
    root: PathBuf,
}

impl FsKvStore {
    /// Opens a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("Opened filesystem store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty()
            || bucket == "."
            || bucket == ".."
            || bucket.contains(['/', '\\'])
        {
            return Err(KvError::InvalidKey(format!("bucket name {bucket:?}")));
        }
        Ok(self.root.join(bucket))
    }

    fn value_path(&self, bucket: &str, key: &[u8]) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.bucket_dir(bucket)?.join(file_name(key)))
    }
}

impl KvStore for FsKvStore {
    fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let path = self.value_path(bucket, key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let path = self.value_path(bucket, key)?;
        fs::create_dir_all(self.bucket_dir(bucket)?)?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        let tmp = PathBuf::from(tmp);

        if let Err(e) = write_synced(&tmp, value).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        let path = self.value_path(bucket, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(value)?;
    file.sync_all()
}

fn file_name(key: &[u8]) -> String {
    if key.len() * 2 <= MAX_HEX_NAME {
        return hex_encode(key);
    }
    let mut hasher = Sha256::new();
    hasher.update(key);
    format!("sha256-{:x}", hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
