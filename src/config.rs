//! Runtime configuration for the Pokedex CLI
//!
//! Settings are layered: built-in defaults, then an optional JSON config file,
//! then command-line flags. The default config file lives in the XDG config
//! directory (`~/.config/pokedex/config.json` on Linux).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cache::{CacheConfig, DEFAULT_TTL, MAX_SWEEP_INTERVAL};
use crate::data::pokeapi::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration string could not be parsed
    #[error("Invalid duration '{0}'. Use a number with an optional unit: ms, s, m, h")]
    InvalidDuration(String),

    /// A duration that must be positive was zero
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A duration exceeded the longest value allowed for it
    #[error("{name} must be at most {max:?}")]
    TooLarge { name: &'static str, max: Duration },

    /// The config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has unknown keys
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parses a duration such as `250ms`, `5s`, `2m`, `1h`, or bare seconds (`30`)
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let s = input.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| ConfigError::InvalidDuration(input.to_string()))?;

    let secs_per_unit = match unit.trim() {
        "ms" => return Ok(Duration::from_millis(value)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return Err(ConfigError::InvalidDuration(input.to_string())),
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidDuration(input.to_string()))
}

/// Returns the default config file path, if a home directory can be determined
pub fn default_config_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "pokedex")?;
    Some(project_dirs.config_dir().join("config.json"))
}

/// Contents of a config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub cache_ttl: Option<String>,
    pub sweep_interval: Option<String>,
    pub request_timeout: Option<String>,
}

impl FileConfig {
    /// Reads and parses a config file
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `explicit` if given, otherwise the default file if it exists
    ///
    /// A missing default file yields an empty config; a missing explicit file
    /// is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub cache_ttl: Option<Duration>,
    pub sweep_interval: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

/// Fully resolved application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PokeAPI base URL, without trailing slash
    pub base_url: String,
    /// How long a cached response stays usable
    pub cache_ttl: Duration,
    /// How often the cache reaper runs; follows the TTL unless set
    pub sweep_interval: Duration,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_TTL,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Merges defaults, file values and overrides, in increasing precedence
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_string();

        let cache_ttl = match overrides.cache_ttl {
            Some(ttl) => ttl,
            None => parse_optional(file.cache_ttl.as_deref())?.unwrap_or(defaults.cache_ttl),
        };

        let sweep_interval = match overrides.sweep_interval {
            Some(interval) => Some(interval),
            None => parse_optional(file.sweep_interval.as_deref())?,
        }
        .unwrap_or(cache_ttl);

        let request_timeout = match overrides.request_timeout {
            Some(timeout) => timeout,
            None => parse_optional(file.request_timeout.as_deref())?
                .unwrap_or(defaults.request_timeout),
        };

        let config = Self {
            base_url,
            cache_ttl,
            sweep_interval,
            request_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("cache TTL"));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("sweep interval"));
        }
        if self.sweep_interval > MAX_SWEEP_INTERVAL {
            return Err(ConfigError::TooLarge {
                name: "sweep interval",
                max: MAX_SWEEP_INTERVAL,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.cache_ttl).with_sweep_interval(self.sweep_interval)
    }
}

fn parse_optional(value: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    value.map(parse_duration).transpose()
}
