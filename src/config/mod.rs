use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_PATH: &str = "config/app.toml";
pub const ENV_PATH: &str = "config/.env";

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_API_PATH: &str = "v1beta/models";
const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_MAX_ROUNDS: usize = 3;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

static ENV_LOADER: Once = Once::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: String,
    pub endpoint: String,
    pub api_path: String,
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_rounds: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
    /// `None` disables idle-session eviction.
    pub session_ttl: Option<Duration>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    model: Option<String>,
    endpoint: Option<String>,
    api_path: Option<String>,
    api_key_env: Option<String>,
    api_key: Option<String>,
    bind_addr: Option<String>,
    max_rounds: Option<usize>,
    model_timeout_secs: Option<u64>,
    tool_timeout_secs: Option<u64>,
    session_ttl_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_rounds: DEFAULT_MAX_ROUNDS,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            session_ttl: Some(Duration::from_secs(DEFAULT_SESSION_TTL_SECS)),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `config/app.toml` when `path` is `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error. The API key is resolved from the process environment (after
    /// `config/.env` has been applied) and falls back to `api_key` in the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        ensure_env_loaded();
        let mut config = match path {
            Some(path) => read_config(path)?,
            None => match read_config(Path::new(CONFIG_PATH)) {
                Ok(config) => config,
                Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    info!("Configuration file not found; using defaults");
                    Self::default()
                }
                Err(other) => return Err(other),
            },
        };
        config.resolve_api_key(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Environment wins over the file value; blank values count as unset.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(&self.api_key_env).filter(|key| !key.trim().is_empty());
        if from_env.is_some() {
            debug!(variable = self.api_key_env.as_str(), "API key taken from environment");
            self.api_key = from_env;
        } else {
            self.api_key = self.api_key.take().filter(|key| !key.trim().is_empty());
        }
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let bind_addr = match raw.bind_addr {
            Some(addr) => addr
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("bind_addr '{addr}' is not a socket address")))?,
            None => defaults.bind_addr,
        };
        let max_rounds = raw.max_rounds.unwrap_or(defaults.max_rounds);
        if max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be at least 1".into()));
        }
        let model = raw.model.unwrap_or(defaults.model);
        if model.trim().is_empty() {
            return Err(ConfigError::Invalid("model cannot be empty".into()));
        }

        Ok(Self {
            model,
            endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
            api_path: raw.api_path.unwrap_or(defaults.api_path),
            api_key_env: raw.api_key_env.unwrap_or(defaults.api_key_env),
            api_key: raw.api_key,
            bind_addr,
            max_rounds,
            model_timeout: raw
                .model_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.model_timeout),
            tool_timeout: raw
                .tool_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.tool_timeout),
            session_ttl: match raw.session_ttl_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.session_ttl,
            },
        })
    }
}

/// Applies `config/.env` once per process.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading application configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_raw(parsed)
}
