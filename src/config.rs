//! # Configuration
//!
//! Two layers:
//!
//! - [`RuntimeConfig`] - coroutine runtime tuning, from environment only
//! - [`AppConfig`] - server settings, from an optional YAML file with
//!   environment overrides applied on top
//!
//! ## Environment Variables
//!
//! ### `BURROW_STACK_SIZE`
//!
//! Coroutine stack size in bytes, decimal (`16384`) or hex (`0x4000`).
//! Default `0x4000` (16 KB). Every connection runs in its own coroutine, so
//! total stack memory is roughly `stack_size x concurrent connections`.
//!
//! ### `BURROW_WORKERS`
//!
//! Scheduler worker threads. Default: available parallelism.
//!
//! ### `BURROW_ADDR`
//!
//! Listen address, overriding `server.addr` from the YAML file.
//!
//! ## YAML layout
//!
//! ```yaml
//! server:
//!   addr: "0.0.0.0:8080"
//! pool:
//!   shards: 8
//!   max_idle_per_shard: 256
//! logging:
//!   level: info
//!   format: json
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context_pool::ContextPoolConfig;
use crate::logging::{LogConfig, LogFormat};

const DEFAULT_STACK_SIZE: usize = 0x4000;

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Coroutine runtime settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Coroutine stack size in bytes
    pub stack_size: usize,
    /// Scheduler worker threads
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: default_workers(),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("BURROW_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = env::var("BURROW_WORKERS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(default_workers);
        Self {
            stack_size,
            workers,
        }
    }

    /// Apply to the global `may` scheduler. Call once, before serving.
    pub fn apply(&self) {
        may::config()
            .set_stack_size(self.stack_size)
            .set_workers(self.workers);
    }
}

/// Configuration loading failure
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Yaml { path: PathBuf, source: serde_yaml::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Yaml { path, source } => {
                write!(f, "invalid config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Yaml { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    pub shards: Option<usize>,
    pub max_idle_per_shard: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

/// File-backed application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub pool: PoolSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Parse YAML text. Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Read `path`, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Yaml`]
    /// when it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env();
        Ok(config)
    }

    /// `load` when a path is given, defaults plus environment otherwise.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = env::var("BURROW_ADDR") {
            self.server.addr = addr;
        }
        if let Some(shards) = env::var("BURROW_POOL_SHARDS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.pool.shards = Some(shards);
        }
        if let Some(max_idle) = env::var("BURROW_POOL_MAX_IDLE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.pool.max_idle_per_shard = Some(max_idle);
        }
        if let Ok(level) = env::var("BURROW_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
        if let Ok(format) = env::var("BURROW_LOG_FORMAT") {
            self.logging.format = Some(LogFormat::parse(&format));
        }
    }

    /// Pool sizing, unset fields falling back to the pool defaults
    #[must_use]
    pub fn pool_config(&self) -> ContextPoolConfig {
        let defaults = ContextPoolConfig::default();
        ContextPoolConfig {
            shards: self.pool.shards.filter(|n| *n > 0).unwrap_or(defaults.shards),
            max_idle_per_shard: self
                .pool
                .max_idle_per_shard
                .unwrap_or(defaults.max_idle_per_shard),
        }
    }

    /// Logging settings from the environment, with file values layered on top
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig::from_env();
        if let Some(level) = &self.logging.level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.logging.format {
            config.format = format;
        }
        config
    }
}
