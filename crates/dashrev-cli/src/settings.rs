//! Settings file for the CLI
//!
//! ```toml
//! log_level = "warn"
//!
//! [history]
//! page_size = 20
//! restore_strategy = "refetch"
//!
//! [http]
//! base_url = "https://grafana.example.com/"
//! api_key = "..."
//! ```
//!
//! Every key can be overridden from the environment, e.g.
//! `DASHREV_HTTP__BASE_URL` or `DASHREV_HISTORY__PAGE_SIZE`.

use std::path::Path;

use dashrev_history::{ConfigLoader, HistoryConfig};
use dashrev_http::HttpConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Complete CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliSettings {
    /// Default tracing filter
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// History controller settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Dashboard server settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history: HistoryConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl CliSettings {
    /// Load from `path` (or the default location) plus environment, then validate
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let loader = match path {
            Some(path) => ConfigLoader::with_path(path),
            None => ConfigLoader::new(),
        };
        let settings: Self = loader.load()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check both sections
    pub fn validate(&self) -> CliResult<()> {
        self.history.validate()?;
        if self.http.base_url.trim().is_empty() {
            return Err(CliError::Config("http.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashrev_history::RestoreStrategy;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = CliSettings::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.history.page_size, 10);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_sections_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
log_level = "info"

[history]
page_size = 25
restore_strategy = "refetch"

[http]
base_url = "http://dash.internal:3000/"
retry_count = 1
"#,
        )
        .unwrap();

        let settings = CliSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.history.page_size, 25);
        assert_eq!(settings.history.restore_strategy, RestoreStrategy::Refetch);
        assert_eq!(settings.http.base_url, "http://dash.internal:3000/");
        assert_eq!(settings.http.retry_count, 1);
        assert_eq!(settings.http.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_history_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history]\npage_size = 0\n").unwrap();

        assert!(matches!(
            CliSettings::load(Some(&path)),
            Err(CliError::History(_))
        ));
    }
}
