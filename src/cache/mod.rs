//! Generic caching layer for conditional fetching and offline support.
//!
//! This module provides a catalog-agnostic caching mechanism that:
//! - Persists one snapshot of processed records with the HTTP validators that produced it
//! - Revalidates with `If-None-Match` / `If-Modified-Since` on every run
//! - Reuses the snapshot on 304 or on a 200 with matching validators
//! - Provides basic offline mode (serve stale cache when network or decoding fails)

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, JsonFileStorage, NoopStorage};
pub use traits::{FetchOutcome, Validators};
