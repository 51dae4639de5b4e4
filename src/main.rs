mod cache;
mod cli;
mod config;
mod error;
mod evolution;
mod logging;
mod output;
mod query;

use color_eyre::Result;
use std::io::Write;
use tracing::debug;

use cache::{CacheStorage, JsonFileStorage, NoopStorage};
use config::Config;
use evolution::CachedEvolutionClient;
use output::LbItem;
use query::Query;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = cli::Args::parse();
  if args.help {
    print!("{}", cli::USAGE);
    return Ok(());
  }

  let debug = args.debug || logging::debug_from_env();
  let _guard = logging::init(debug);
  let switch = if args.debug { "flag" } else { "environment" };
  debug!(switch, "debug logging enabled");

  let items = resolve(&args.query).await;

  let mut stdout = std::io::stdout().lock();
  writeln!(stdout, "{}", output::render_or_fallback(&items))?;
  stdout.flush()?;

  Ok(())
}

/// Always produces a list: results, or a single error row.
async fn resolve(query: &str) -> Vec<LbItem> {
  match Config::load() {
    Ok(config) => resolve_with(&config, query).await,
    Err(e) => vec![LbItem::from_error("ConfigError", e.as_ref())],
  }
}

async fn resolve_with(config: &Config, query: &str) -> Vec<LbItem> {
  if !config.cache.enabled {
    debug!("cache disabled by configuration");
    return search(config, NoopStorage, query).await;
  }

  match JsonFileStorage::open(config) {
    Some(storage) => {
      debug!(path = %storage.path().display(), "using cache file");
      search(config, storage, query).await
    }
    None => {
      debug!("no cache directory available");
      search(config, NoopStorage, query).await
    }
  }
}

async fn search<S: CacheStorage>(config: &Config, storage: S, query: &str) -> Vec<LbItem> {
  let client = match CachedEvolutionClient::new(config, storage) {
    Ok(client) => client,
    Err(e) => return vec![LbItem::from_error("ConfigError", e.as_ref())],
  };

  match client.search(&Query::parse(query)).await {
    Ok(items) => items,
    Err(e) => {
      debug!(error = %e, "returning error item");
      vec![LbItem::from_error(e.kind(), &e)]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CacheConfig;
  use crate::evolution::test_server::{StubResponse, StubServer};

  const CATALOG: &str = r#"{
    "creationDate": "2024-05-14T13:38:30Z",
    "schemaVersion": "1.0.0",
    "proposals": [
      {
        "id": "SE-0296",
        "title": "Async/await",
        "link": "0296-async-await.md",
        "status": {"state": "implemented", "version": "5.5"}
      }
    ]
  }"#;

  fn config(server: &StubServer, cache_dir: &tempfile::TempDir, enabled: bool) -> Config {
    Config {
      catalog_url: server.url(),
      timeout_ms: 2_000,
      cache: CacheConfig {
        enabled,
        dir: Some(cache_dir.path().to_path_buf()),
      },
      ..Config::default()
    }
  }

  #[tokio::test]
  async fn test_bad_base_url_is_a_single_config_error_row() {
    let server = StubServer::start(vec![StubResponse::ok(CATALOG)]).await;
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
      proposals_base_url: "not a url".to_string(),
      ..config(&server, &dir, true)
    };

    let items = resolve_with(&config, "").await;

    assert_eq!(items.len(), 1);
    assert!(items[0].title.starts_with("Error: "));
    assert!(items[0]
      .subtitle
      .as_deref()
      .unwrap()
      .starts_with("ConfigError: "));
    assert!(server.requests().is_empty());
  }

  #[tokio::test]
  async fn test_disabled_cache_writes_nothing() {
    let server = StubServer::start(vec![StubResponse::ok(CATALOG)]).await;
    let dir = tempfile::tempdir().unwrap();

    let items = resolve_with(&config(&server, &dir, false), "async").await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "SE-0296: Async/await");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn test_enabled_cache_writes_snapshot() {
    let server = StubServer::start(vec![StubResponse::ok(CATALOG)]).await;
    let dir = tempfile::tempdir().unwrap();

    let items = resolve_with(&config(&server, &dir, true), "").await;

    assert_eq!(items.len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
  }
}
