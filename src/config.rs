use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "EVOLUTION_LOOKUP_CONFIG";

pub const DEFAULT_CATALOG_URL: &str =
  "https://download.swift.org/swift-evolution/v1/evolution.json";
pub const DEFAULT_PROPOSALS_BASE_URL: &str =
  "https://github.com/apple/swift-evolution/blob/main/proposals";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Location of the evolution.json catalog
  pub catalog_url: String,
  /// Base path that proposal links are appended to
  pub proposals_base_url: String,
  /// Whole-request timeout; expiry fails the fetch
  pub timeout_ms: u64,
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// Directory for the snapshot file (defaults to the platform cache dir)
  pub dir: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      catalog_url: DEFAULT_CATALOG_URL.to_string(),
      proposals_base_url: DEFAULT_PROPOSALS_BASE_URL.to_string(),
      timeout_ms: 8_000,
      cache: CacheConfig::default(),
    }
  }
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. $EVOLUTION_LOOKUP_CONFIG (must exist)
  /// 2. <platform config dir>/evolution-lookup/config.yaml
  ///
  /// Without a file the built-in defaults apply.
  pub fn load() -> Result<Self> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    Self::load_from(explicit.as_deref())
  }

  fn load_from(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.validate()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    let path = config_dir.join("evolution-lookup").join("config.yaml");
    path.exists().then_some(path)
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.timeout_ms == 0 {
      return Err(eyre!("Invalid timeout_ms {}: must be greater than zero", self.timeout_ms));
    }
    self.proposals_base_url()?;
    Url::parse(&self.catalog_url)
      .map_err(|e| eyre!("Invalid catalog_url '{}': {}", self.catalog_url, e))?;
    Ok(())
  }

  /// Parsed base URL for proposal links.
  pub fn proposals_base_url(&self) -> Result<Url> {
    Url::parse(&self.proposals_base_url)
      .map_err(|e| eyre!("Invalid proposals_base_url '{}': {}", self.proposals_base_url, e))
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_without_file() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
    assert_eq!(config.timeout(), Duration::from_secs(8));
    assert!(config.cache.enabled);
    assert!(config.cache.dir.is_none());
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timeout_ms: 250\ncache:\n  dir: /tmp/evolution\n").unwrap();

    let config = Config::load_from(Some(&path)).unwrap();

    assert_eq!(config.timeout(), Duration::from_millis(250));
    assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/evolution")));
    assert!(config.cache.enabled);
    assert_eq!(config.proposals_base_url, DEFAULT_PROPOSALS_BASE_URL);
  }

  #[test]
  fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(Some(&dir.path().join("nope.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_invalid_url_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "catalog_url: not a url\n").unwrap();

    let err = Config::load_from(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Invalid catalog_url"));
  }

  #[test]
  fn test_zero_timeout_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timeout_ms: 0\n").unwrap();

    let err = Config::load_from(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Invalid timeout_ms"));
  }

  #[test]
  fn test_malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timeout_ms: [\n").unwrap();

    assert!(Config::load_from(Some(&path)).is_err());
  }
}
