use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderName, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, Instrument};

use crate::cache::{FetchOutcome, Validators};
use crate::config::Config;
use crate::error::FetchError;

/// Conditional HTTP client for the catalog document
#[derive(Clone)]
pub struct EvolutionClient {
  http: reqwest::Client,
  catalog_url: String,
  timeout: Duration,
}

impl EvolutionClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(config.timeout())
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      catalog_url: config.catalog_url.clone(),
      timeout: config.timeout(),
    })
  }

  /// Issue one GET carrying the given validators.
  ///
  /// 304 is `NotModified`, 200 is `NewData` with the response's own
  /// validators, anything else is an error. No retries.
  pub async fn fetch(&self, validators: Validators) -> Result<FetchOutcome, FetchError> {
    let span = debug_span!(
      "fetch_catalog",
      etag = ?validators.etag,
      last_modified = ?validators.last_modified
    );
    self.fetch_inner(validators).instrument(span).await
  }

  async fn fetch_inner(&self, validators: Validators) -> Result<FetchOutcome, FetchError> {
    let started = Instant::now();

    let mut request = self.http.get(&self.catalog_url);
    if let Some(etag) = &validators.etag {
      request = request.header(IF_NONE_MATCH, etag);
    }
    if let Some(last_modified) = &validators.last_modified {
      request = request.header(IF_MODIFIED_SINCE, last_modified);
    }

    let response = request.send().await.map_err(|e| self.transport_error(e))?;
    let status = response.status();

    match status {
      StatusCode::NOT_MODIFIED => {
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "304 Not Modified");
        Ok(FetchOutcome::NotModified)
      }
      StatusCode::OK => {
        let validators = response_validators(response.headers());
        let body = response
          .bytes()
          .await
          .map_err(|e| self.transport_error(e))?;
        debug!(
          elapsed_ms = started.elapsed().as_millis() as u64,
          bytes = body.len(),
          etag = ?validators.etag,
          last_modified = ?validators.last_modified,
          "200 OK"
        );
        Ok(FetchOutcome::NewData {
          body: body.to_vec(),
          validators,
        })
      }
      _ => {
        debug!(%status, "unexpected status");
        Err(FetchError::UnexpectedStatus {
          url: self.catalog_url.clone(),
          status,
        })
      }
    }
  }

  fn transport_error(&self, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
      FetchError::Timeout {
        url: self.catalog_url.clone(),
        timeout: self.timeout,
        source,
      }
    } else {
      FetchError::Transport {
        url: self.catalog_url.clone(),
        source,
      }
    }
  }
}

fn response_validators(headers: &HeaderMap) -> Validators {
  let header = |name: HeaderName| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(String::from)
  };
  Validators {
    etag: header(ETAG),
    last_modified: header(LAST_MODIFIED),
  }
}
