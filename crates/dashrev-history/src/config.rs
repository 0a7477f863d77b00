//! History controller configuration and file/environment loading

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};
use crate::models::DiffFormat;

/// How the revision log is brought up to date after a successful restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreStrategy {
    /// Synthesize the new head locally from the current head
    #[default]
    Optimistic,
    /// Re-fetch the first page of the log from the backend
    Refetch,
}

/// Zone used when rendering revision timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTimezone {
    /// Coordinated universal time
    #[default]
    Utc,
    /// The viewer's local zone
    #[serde(alias = "browser")]
    Local,
}

impl DisplayTimezone {
    /// Render a timestamp as `YYYY-MM-DD HH:mm:ss`, or `YYYY-MM-DD` when `omit_time`
    pub fn format(&self, ts: DateTime<Utc>, omit_time: bool) -> String {
        let pattern = if omit_time {
            "%Y-%m-%d"
        } else {
            "%Y-%m-%d %H:%M:%S"
        };
        match self {
            DisplayTimezone::Utc => ts.format(pattern).to_string(),
            DisplayTimezone::Local => ts.with_timezone(&Local).format(pattern).to_string(),
        }
    }
}

/// History controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Revisions fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Column the backend orders the log by
    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// Maximum number of versions selectable for comparison
    #[serde(default = "default_max_selection")]
    pub max_selection: usize,

    /// Diff format requested when none is chosen explicitly
    #[serde(default)]
    pub default_diff_format: DiffFormat,

    /// How the log is updated after a restore
    #[serde(default)]
    pub restore_strategy: RestoreStrategy,

    /// Display zone for documents that do not specify one
    #[serde(default)]
    pub timezone: DisplayTimezone,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            order_by: default_order_by(),
            max_selection: default_max_selection(),
            default_diff_format: DiffFormat::default(),
            restore_strategy: RestoreStrategy::default(),
            timezone: DisplayTimezone::default(),
        }
    }
}

impl HistoryConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the restore strategy
    pub fn with_restore_strategy(mut self, strategy: RestoreStrategy) -> Self {
        self.restore_strategy = strategy;
        self
    }

    /// Set the default diff format
    pub fn with_default_diff_format(mut self, format: DiffFormat) -> Self {
        self.default_diff_format = format;
        self
    }

    /// Check the config for values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(HistoryError::config("page_size must be greater than 0"));
        }
        if self.max_selection < 2 {
            return Err(HistoryError::config("max_selection must be at least 2"));
        }
        if self.order_by.trim().is_empty() {
            return Err(HistoryError::config("order_by cannot be empty"));
        }
        Ok(())
    }
}

fn default_page_size() -> usize {
    10
}

fn default_order_by() -> String {
    "version".to_string()
}

fn default_max_selection() -> usize {
    2
}

/// Loads configuration from an optional TOML file overlaid with environment variables
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader for the default path and `DASHREV_` environment prefix
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "DASHREV".to_string(),
        }
    }

    /// Loader for a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// File the loader reads
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dashrev")
            .join("config.toml")
    }

    /// Deserialize any config section tree from the file and environment
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let config = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load and validate the history section
    pub fn load_history(&self) -> Result<HistoryConfig> {
        #[derive(Deserialize, Default)]
        struct Root {
            #[serde(default)]
            history: Option<HistoryConfig>,
        }

        let root: Root = self.load()?;
        let history = root.history.unwrap_or_default();
        history.validate()?;
        Ok(history)
    }

    /// Write a config tree as TOML to the loader's path
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = toml::to_string_pretty(value).map_err(|e| HistoryError::config(e.to_string()))?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::config(e.to_string()))?;
        }
        std::fs::write(&self.config_path, text).map_err(|e| HistoryError::config(e.to_string()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
