//! Application-level configuration loading, including the API key used by the hardened variant.

use std::{
    env, fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/time-service.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TIME_SERVICE_CONFIG_PATH";
/// Environment variable carrying the shared API key.
pub const API_KEY_ENV: &str = "API_KEY";
/// Placeholder key used when the hardened variant runs without [`API_KEY_ENV`].
pub const DEVELOPMENT_API_KEY: &str = "dev-api-key-change-me";
/// Port the service listens on. Not configurable.
pub const LISTEN_PORT: u16 = 5001;

/// Errors raised when a configuration file exists but cannot be used.
///
/// A missing file is not an error: the built-in defaults apply.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {}", .path.display())]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON or contains unknown keys.
    #[error("failed to parse config {}", .path.display())]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Shared secret compared against the `X-API-Key` request header.
///
/// The `Debug` implementation never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Exact, case-sensitive comparison with a caller-supplied key.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    metrics_enabled: bool,
    api_key: Option<ApiKey>,
}

impl AppConfig {
    /// Load the configuration from disk and the environment.
    ///
    /// Falls back to built-in defaults only when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = resolve_config_path();
        Self::load_from(&path, env::var(API_KEY_ENV).ok())
    }

    /// Load the configuration file at `path`, using `api_key` as the value of [`API_KEY_ENV`].
    pub fn load_from(path: &Path, api_key: Option<String>) -> Result<Self, ConfigError> {
        let raw = read_raw_config(path)?;
        let config = Self::from_raw(raw, api_key);
        info!(
            metrics = config.metrics_enabled,
            hardened = config.is_hardened(),
            "service configuration ready"
        );
        Ok(config)
    }

    fn from_raw(raw: RawConfig, api_key: Option<String>) -> Self {
        let api_key = raw.hardened.then(|| {
            match api_key.filter(|key| !key.is_empty()) {
                Some(key) => ApiKey::new(key),
                None => {
                    warn!(
                        env = API_KEY_ENV,
                        "API key not set; falling back to the development key"
                    );
                    ApiKey::new(DEVELOPMENT_API_KEY)
                }
            }
        });

        Self {
            metrics_enabled: raw.metrics,
            api_key,
        }
    }

    /// Toggle the metrics registry and the `/metrics` endpoint.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Enable the hardened variant guarded by `key`.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Whether request metrics are collected and exported.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    /// Configured API key, present only in the hardened variant.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Whether the API-key check and security headers are active.
    pub fn is_hardened(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default(), None)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    metrics: bool,
    hardened: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            metrics: true,
            hardened: false,
        }
    }
}

fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let raw = serde_json::from_str::<RawConfig>(&contents).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_owned(),
                    source,
                }
            })?;
            info!(path = %path.display(), "loaded configuration file");
            Ok(raw)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                path = %path.display(),
                "config file not found; using built-in defaults"
            );
            Ok(RawConfig::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
