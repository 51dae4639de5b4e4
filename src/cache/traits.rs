//! Core types for the conditional caching system.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// HTTP validators identifying one version of a remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validators {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub etag: Option<String>,
  #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
  pub last_modified: Option<String>,
}

impl Validators {
  /// True when either validator is present on both sides and equal.
  ///
  /// Servers that skip 304 but still send identical validators are treated
  /// as unchanged. A match on a single validator is enough.
  pub fn matches(&self, other: &Validators) -> bool {
    let same_etag = matches!((&self.etag, &other.etag), (Some(a), Some(b)) if a == b);
    let same_last_modified = matches!(
      (&self.last_modified, &other.last_modified),
      (Some(a), Some(b)) if a == b
    );
    same_etag || same_last_modified
  }
}

/// Interpreted response of a conditional fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
  /// 304 - the copy identified by the request validators is current
  NotModified,
  /// 200 - a full body plus the response's own validators
  NewData { body: Vec<u8>, validators: Validators },
}

/// A complete persisted snapshot of processed records.
///
/// Written wholesale; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
  #[serde(flatten)]
  pub validators: Validators,
  #[serde(rename = "cachedAt")]
  pub cached_at: DateTime<Utc>,
  #[serde(rename = "proposals")]
  pub records: Vec<T>,
}

impl<T> Snapshot<T> {
  /// Create a snapshot stamped with the current time (whole seconds).
  pub fn new(validators: Validators, records: Vec<T>) -> Self {
    Self {
      validators,
      cached_at: Utc::now().trunc_subsecs(0),
      records,
    }
  }

  /// Time elapsed since the snapshot was written.
  pub fn age(&self) -> TimeDelta {
    Utc::now() - self.cached_at
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached
  pub cached_at: DateTime<Utc>,
}

impl<T> CacheResult<Vec<T>> {
  /// Data freshly decoded from the network.
  pub fn from_network(snapshot: Snapshot<T>) -> Self {
    Self {
      data: snapshot.records,
      source: CacheSource::Network,
      cached_at: snapshot.cached_at,
    }
  }

  /// Data reused from the cache because the server confirmed it is current.
  pub fn from_cache(snapshot: Snapshot<T>, source: CacheSource) -> Self {
    Self {
      data: snapshot.records,
      source,
      cached_at: snapshot.cached_at,
    }
  }

  /// Offline mode - the refresh failed, serving the stored snapshot.
  pub fn offline(snapshot: Snapshot<T>) -> Self {
    Self::from_cache(snapshot, CacheSource::Offline)
  }
}

/// Indicates where resolved data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Server answered 304
  NotModified,
  /// Server answered 200 with validators matching the cache
  Unchanged,
  /// Network or decoding failed, serving cached data
  Offline,
}
