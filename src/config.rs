use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub listing: ListingConfig,
  #[serde(default)]
  pub log: LogConfig,
  /// Custom title for header (defaults to "stockroom")
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the REST backend, e.g. "https://wms.example.com/api"
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

/// Defaults applied to every resource listing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
  pub page_size: u32,
  pub enable_cache: bool,
  pub cache_ttl_secs: u64,
}

impl Default for ListingConfig {
  fn default() -> Self {
    Self {
      page_size: 10,
      enable_cache: false,
      cache_ttl_secs: 300,
    }
  }
}

impl ListingConfig {
  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache_ttl_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter directive used when STOCKROOM_LOG is unset
  pub level: String,
  /// Directory for log files (defaults to the platform data directory)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./stockroom.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/stockroom/config.yaml
  ///
  /// `api_url` overrides the file's backend URL; with no file at all it is
  /// enough to run on defaults.
  pub fn load(explicit_path: Option<&Path>, api_url: Option<String>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match (path, api_url) {
      (Some(p), url) => {
        let mut config = Self::load_from_path(&p)?;
        if let Some(url) = url {
          config.api.url = url;
        }
        Ok(config)
      }
      (None, Some(url)) => Ok(Self::for_url(url)),
      (None, None) => Err(eyre!(
        "No configuration file found. Create one at ~/.config/stockroom/config.yaml\n\
                 with at least `api: {{ url: ... }}`, or pass --api-url."
      )),
    }
  }

  /// Defaults for everything but the backend URL
  pub fn for_url(url: String) -> Self {
    Self {
      api: ApiConfig {
        url,
        timeout_secs: default_timeout_secs(),
      },
      listing: ListingConfig::default(),
      log: LogConfig::default(),
      title: None,
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("stockroom.yaml");
    if local.exists() {
      return Some(local);
    }

    let xdg_path = dirs::config_dir()?.join("stockroom").join("config.yaml");
    xdg_path.exists().then_some(xdg_path)
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.listing.page_size == 0 {
      return Err(eyre!("listing.page_size must be at least 1"));
    }
    Ok(config)
  }

  /// Get the backend API token from the environment, if one is set.
  ///
  /// Reads STOCKROOM_API_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("STOCKROOM_API_TOKEN")
      .ok()
      .filter(|token| !token.trim().is_empty())
  }
}
