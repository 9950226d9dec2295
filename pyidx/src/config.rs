//! # Configuration
//!
//! Settings live in a YAML file and every field has a default, so an absent
//! file is the same as an empty one. Command-line flags are applied on top
//! by the binary.
//!
//! ```yaml
//! bucket: packages
//! prefix: simple
//! acl: public-read
//! static_website: false
//! force: false
//! root_index: true
//! store:
//!   kind: http
//!   endpoint: http://localhost:9000
//!   timeout_secs: 30
//! log:
//!   level: info
//!   format: human
//! ```
//!
//! ## Lookup order
//!
//! 1. `--config <path>`
//! 2. `$PYIDX_CONFIG`
//! 3. `<config dir>/pyidx/config.yaml` (e.g. `~/.config/pyidx/config.yaml`)

use crate::error::ConfigError;
use crate::storage::StorageOptions;
use pyidx_logging::LogSettings;
use pyidx_store::{HttpStore, HttpStoreConfig, LocalStore, ObjectStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PYIDX_CONFIG";

/// Canned ACL applied when none is configured.
pub const DEFAULT_ACL: &str = "private";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bucket name, required by the http store
    pub bucket: Option<String>,
    /// Key prefix every object is stored under
    pub prefix: Option<String>,
    /// Canned ACL for every stored object
    pub acl: String,
    /// Store indexes as `<dir>/index.html` instead of the `<dir>/` object,
    /// for buckets served through static website hosting
    pub static_website: bool,
    /// Re-upload files the index already lists
    pub force: bool,
    /// Maintain the listing of all package directories at the prefix root
    pub root_index: bool,
    pub store: StoreConfig,
    pub log: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: None,
            acl: DEFAULT_ACL.to_string(),
            static_website: false,
            force: false,
            root_index: true,
            store: StoreConfig::default(),
            log: LogSettings::default(),
        }
    }
}

/// Which backend holds the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// A local directory laid out like the bucket
    Local { path: PathBuf },
    /// An S3-compatible endpoint addressed path-style
    Http {
        endpoint: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            path: PathBuf::from("bucket"),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the config file per the lookup order and load it.
    ///
    /// An explicitly requested file must exist; the fallbacks are optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        match default_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.acl.trim().is_empty() {
            return Err(ConfigError::Invalid("acl must not be empty".to_string()));
        }
        if let StoreConfig::Http { endpoint, .. } = &self.store {
            self.http_bucket()?;
            parse_endpoint(endpoint)?;
        }
        Ok(())
    }

    fn http_bucket(&self) -> Result<&str, ConfigError> {
        self.bucket
            .as_deref()
            .map(str::trim)
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| ConfigError::Invalid("the http store requires a bucket".to_string()))
    }

    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions {
            prefix: self.prefix.clone(),
            acl: self.acl.clone(),
            static_website: self.static_website,
        }
    }

    /// Build the configured backend.
    pub fn open_store(&self) -> Result<Box<dyn ObjectStore>, crate::error::PublishError> {
        self.validate()?;
        match &self.store {
            StoreConfig::Local { path } => Ok(Box::new(LocalStore::new(path))),
            StoreConfig::Http {
                endpoint,
                timeout_secs,
            } => {
                let config = HttpStoreConfig::new(parse_endpoint(endpoint)?, self.http_bucket()?)
                    .with_timeout(Duration::from_secs(*timeout_secs));
                Ok(Box::new(HttpStore::new(config)?))
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::Invalid(format!("invalid endpoint '{endpoint}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "endpoint '{endpoint}' must use http or https"
        )));
    }
    Ok(url)
}

/// `<config dir>/pyidx/config.yaml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pyidx").join("config.yaml"))
}
