//! Error taxonomy for the fetch pipeline.
//!
//! Network and parse failures escape their components and are caught by the
//! cache layer, which falls back to a stored snapshot when one exists. Cache
//! faults never leave the storage module.

use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a usable response from the catalog endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request to {url} timed out after {}ms", .timeout.as_millis())]
  Timeout {
    url: String,
    timeout: Duration,
    #[source]
    source: reqwest::Error,
  },

  #[error("request to {url} failed")]
  Transport {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("unexpected HTTP status {status} from {url}")]
  UnexpectedStatus {
    url: String,
    status: reqwest::StatusCode,
  },

  #[error("server reported 304 Not Modified but no cached catalog exists")]
  NotModifiedWithoutCache,
}

/// The catalog body could not be decoded.
#[derive(Debug, Error)]
#[error("failed to decode catalog document")]
pub struct ParseError(#[from] pub serde_json::Error);

/// Read or write fault in the local snapshot store.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("cache I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to encode cache snapshot: {0}")]
  Encode(#[from] serde_json::Error),
}

/// Failure of a whole resolve attempt with no snapshot to fall back on.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error(transparent)]
  Network(#[from] FetchError),

  #[error(transparent)]
  Parse(#[from] ParseError),
}

impl ResolveError {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Network(_) => "NetworkError",
      Self::Parse(_) => "ParseError",
    }
  }
}

/// Render an error as `"<kind>: <message>"` followed by its source chain.
///
/// The output only depends on `Display` of each link, so it is stable across
/// runs and safe to embed in the structured output.
pub fn describe_error(kind: &str, err: &(dyn StdError + 'static)) -> String {
  let mut out = format!("{}: {}", kind, err);
  let mut source = err.source();
  while let Some(cause) = source {
    out.push_str("\n  caused by: ");
    out.push_str(&cause.to_string());
    source = cause.source();
  }
  out
}
