//! Cache storage trait and JSON file implementation.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::traits::Snapshot;
use crate::config::Config;
use crate::error::CacheError;

/// Trait for cache storage backends.
///
/// Neither operation reports failure: an unreadable snapshot is a miss and a
/// failed write is dropped.
pub trait CacheStorage: Send + Sync {
  /// Load the stored snapshot, if a well-formed one exists.
  fn load<T: DeserializeOwned>(&self) -> Option<Snapshot<T>>;

  /// Replace the stored snapshot.
  fn save<T: Serialize>(&self, snapshot: &Snapshot<T>);
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn load<T: DeserializeOwned>(&self) -> Option<Snapshot<T>> {
    None // Always miss
  }

  fn save<T: Serialize>(&self, _snapshot: &Snapshot<T>) {
    // Discard
  }
}

/// Single-file JSON snapshot storage.
///
/// No locking: one process reads once and writes at most once.
pub struct JsonFileStorage {
  path: PathBuf,
}

impl JsonFileStorage {
  /// Storage backed by the given file.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Storage at the configured location, or `None` if no cache directory
  /// can be determined.
  pub fn open(config: &Config) -> Option<Self> {
    let dir = config
      .cache
      .dir
      .clone()
      .or_else(|| dirs::cache_dir().map(|p| p.join("evolution-lookup")))?;

    Some(Self::new(dir.join(Self::file_name(&config.catalog_url))))
  }

  /// Cache file name derived from the catalog URL.
  fn file_name(catalog_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(catalog_url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("evolution-cache-{}.json", &digest[..16])
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn write<T: Serialize>(&self, snapshot: &Snapshot<T>) -> Result<(), CacheError> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let data = serde_json::to_vec(snapshot)?;

    // Atomic write
    let tmp_path = self
      .path
      .with_extension(format!("json.{}.tmp", std::process::id()));
    let written =
      std::fs::write(&tmp_path, data).and_then(|()| std::fs::rename(&tmp_path, &self.path));
    if let Err(e) = written {
      let _ = std::fs::remove_file(&tmp_path);
      return Err(e.into());
    }

    Ok(())
  }
}

impl CacheStorage for JsonFileStorage {
  fn load<T: DeserializeOwned>(&self) -> Option<Snapshot<T>> {
    let data = match std::fs::read(&self.path) {
      Ok(data) => data,
      Err(e) => {
        debug!(path = %self.path.display(), error = %e, "no readable cache");
        return None;
      }
    };

    match serde_json::from_slice(&data) {
      Ok(snapshot) => Some(snapshot),
      Err(e) => {
        debug!(path = %self.path.display(), error = %e, "discarding malformed cache");
        None
      }
    }
  }

  fn save<T: Serialize>(&self, snapshot: &Snapshot<T>) {
    match self.write(snapshot) {
      Ok(()) => debug!(path = %self.path.display(), "cache saved"),
      Err(e) => debug!(path = %self.path.display(), error = %e, "cache write failed; ignoring"),
    }
  }
}
