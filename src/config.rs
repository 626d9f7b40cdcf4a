// ABOUTME: Configuration loading for the stockroom CLI from a YAML file, environment, and flags.
// ABOUTME: Later sources override earlier ones: defaults, config file, STOCKROOM_* env vars, flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use stockroom_store::{StoreKind, UnknownStoreKind};
use thiserror::Error;

pub const ENV_STORE: &str = "STOCKROOM_STORE";
pub const ENV_DB_FILE: &str = "STOCKROOM_DB_FILE";
pub const ENV_LOG_LEVEL: &str = "STOCKROOM_LOG_LEVEL";

const DEFAULT_DB_FILE: &str = "products.json";
const DEFAULT_CONFIG_NAME: &str = ".stockroom.yaml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    InvalidStore(#[from] UnknownStoreKind),

    #[error("invalid log level: {0} (expected debug, info, warn or error)")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// EnvFilter directives applying this level to the stockroom crates.
    pub fn directives(&self) -> String {
        let level = self.as_str();
        format!("stockroom={level},stockroom_store={level},stockroom_core={level}")
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Shape of the optional YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    pub store: Option<String>,
    #[serde(alias = "db_file")]
    pub db_file: Option<PathBuf>,
    #[serde(alias = "log_level")]
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub store: Option<String>,
    pub db_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StockroomConfig {
    pub store: StoreKind,
    pub db_file: PathBuf,
    pub log_level: LogLevel,
}

impl StockroomConfig {
    /// Load configuration from the config file, the process environment,
    /// and the given overrides.
    ///
    /// Config file: `--config` if given (must exist), else
    /// `$HOME/.stockroom.yaml` when present.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_file {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => FileConfig::read(&path)?,
                None => FileConfig::default(),
            },
        };

        Self::resolve(
            file,
            |key| std::env::var(key).ok().filter(|v| !v.is_empty()),
            overrides,
        )
    }

    /// Merge the sources in precedence order. `env` looks up one variable.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let store = overrides
            .store
            .clone()
            .or_else(|| env(ENV_STORE))
            .or(file.store);
        let store = match store {
            Some(s) => s.parse::<StoreKind>()?,
            None => StoreKind::default(),
        };

        let db_file = overrides
            .db_file
            .clone()
            .or_else(|| env(ENV_DB_FILE).map(PathBuf::from))
            .or(file.db_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| env(ENV_LOG_LEVEL))
            .or(file.log_level);
        let log_level = match log_level {
            Some(l) => l.parse::<LogLevel>()?,
            None => LogLevel::default(),
        };

        Ok(Self {
            store,
            db_file,
            log_level,
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_NAME))
}
