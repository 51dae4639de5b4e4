//! Cache layer that orchestrates conditional fetching against a stored snapshot.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::debug;

use super::storage::CacheStorage;
use super::traits::{CacheResult, CacheSource, FetchOutcome, Snapshot, Validators};
use crate::error::{FetchError, ParseError, ResolveError};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client,
/// providing validator-based revalidation with offline support.
pub struct CacheLayer<S: CacheStorage> {
  storage: S,
}

/// What a successful refresh decided.
enum Refresh<T> {
  /// Keep using the stored snapshot
  Reuse(CacheSource),
  /// A new snapshot was decoded from the response body
  Rebuilt(Snapshot<T>),
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self { storage }
  }

  /// Resolve the record set with a single conditional fetch.
  ///
  /// 1. Load the stored snapshot (a miss is fine)
  /// 2. Fetch with the snapshot's validators
  /// 3. On 304, or a 200 whose validators match, reuse the snapshot
  /// 4. Otherwise decode the body with `build` and persist the result
  /// 5. On any fetch or decode failure, serve the stored snapshot if there is one
  ///
  /// The fetcher receives the validators to send, empty when nothing is cached.
  pub async fn fetch_conditional<T, F, Fut, B>(
    &self,
    fetcher: F,
    build: B,
  ) -> Result<CacheResult<Vec<T>>, ResolveError>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce(Validators) -> Fut,
    Fut: Future<Output = Result<FetchOutcome, FetchError>>,
    B: FnOnce(&[u8]) -> Result<Vec<T>, ParseError>,
  {
    let cached: Option<Snapshot<T>> = self.storage.load();
    match &cached {
      Some(snapshot) => debug!(
        records = snapshot.records.len(),
        etag = ?snapshot.validators.etag,
        last_modified = ?snapshot.validators.last_modified,
        cached_at = %snapshot.cached_at,
        age_secs = snapshot.age().num_seconds(),
        "loaded cache"
      ),
      None => debug!("no cache available"),
    }

    let refreshed = self.refresh(cached.as_ref(), fetcher, build).await;

    match (refreshed, cached) {
      (Ok(Refresh::Reuse(source)), Some(snapshot)) => {
        debug!(?source, "reusing cached snapshot");
        Ok(CacheResult::from_cache(snapshot, source))
      }
      (Ok(Refresh::Reuse(_)), None) => Err(FetchError::NotModifiedWithoutCache.into()),
      (Ok(Refresh::Rebuilt(snapshot)), _) => Ok(CacheResult::from_network(snapshot)),
      (Err(e), Some(snapshot)) => {
        debug!(error = %e, "refresh failed; falling back to cache");
        Ok(CacheResult::offline(snapshot))
      }
      (Err(e), None) => Err(e),
    }
  }

  async fn refresh<T, F, Fut, B>(
    &self,
    cached: Option<&Snapshot<T>>,
    fetcher: F,
    build: B,
  ) -> Result<Refresh<T>, ResolveError>
  where
    T: Serialize,
    F: FnOnce(Validators) -> Fut,
    Fut: Future<Output = Result<FetchOutcome, FetchError>>,
    B: FnOnce(&[u8]) -> Result<Vec<T>, ParseError>,
  {
    let request_validators = cached
      .map(|snapshot| snapshot.validators.clone())
      .unwrap_or_default();

    match fetcher(request_validators).await? {
      FetchOutcome::NotModified => {
        if cached.is_none() {
          return Err(FetchError::NotModifiedWithoutCache.into());
        }
        Ok(Refresh::Reuse(CacheSource::NotModified))
      }
      FetchOutcome::NewData { body, validators } => {
        // Some servers never send 304 but do repeat their validators
        if let Some(snapshot) = cached {
          if snapshot.validators.matches(&validators) {
            debug!("response validators match cache; skipping decode");
            return Ok(Refresh::Reuse(CacheSource::Unchanged));
          }
        }

        let records = build(&body)?;
        let snapshot = Snapshot::new(validators, records);
        self.storage.save(&snapshot);
        debug!(
          records = snapshot.records.len(),
          etag = ?snapshot.validators.etag,
          last_modified = ?snapshot.validators.last_modified,
          "built new snapshot"
        );
        Ok(Refresh::Rebuilt(snapshot))
      }
    }
  }
}
