// Layered settings: defaults, optional file, environment
use config::{Config, Environment, File};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

pub const ENV_PREFIX: &str = "EMR";
pub const ENV_SEPARATOR: &str = "__";

/// Postgres connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/emr".to_string(),
            max_connections: 20,
            min_connections: 1,
            acquire_timeout_secs: 30,
        }
    }
}

/// Paging limits applied by the query builder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QuerySettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmrConfig {
    pub database: DatabaseSettings,
    pub query: QuerySettings,
    pub logging: LoggerConfig,
}

impl EmrConfig {
    /// Load from an optional file plus `EMR__*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
    }

    pub(crate) fn load_with_env(path: Option<&str>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = path, "Loading configuration file");
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let config: EmrConfig = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must be set".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::ValidationError(
                "database.min_connections exceeds database.max_connections".to_string(),
            ));
        }
        if self.query.max_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "query.max_page_size must be at least 1".to_string(),
            ));
        }
        if self.query.default_page_size == 0 || self.query.default_page_size > self.query.max_page_size {
            return Err(ConfigError::ValidationError(
                "query.default_page_size must be between 1 and query.max_page_size".to_string(),
            ));
        }
        Ok(())
    }
}
