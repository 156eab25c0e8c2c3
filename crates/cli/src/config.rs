//! Panel configuration file and command-line overrides.

use anyhow::Context;
use pufferpanel_db::DatabaseConfig;
use serde::Deserialize;
use std::path::Path;

/// Settings read from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Replace the database dialect and URL with the ones given on the
    /// command line or in the environment.
    pub fn override_database(&mut self, dialect: Option<String>, url: Option<String>) {
        if let Some(dialect) = dialect {
            self.database.dialect = dialect;
        }
        if let Some(url) = url {
            self.database.url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_section() {
        let config = AppConfig::from_json(
            r#"{"database": {"dialect": "sqlite3", "url": "panel.db"}, "logLevel": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.database.dialect, "sqlite3");
        assert_eq!(config.database.url, "panel.db");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.database.dialect.is_empty());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/pufferpanel/config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config =
            AppConfig::from_json(r#"{"database": {"dialect": "mysql", "url": "file-url"}}"#)
                .unwrap();

        config.override_database(None, Some("sqlite::memory:".into()));

        assert_eq!(config.database.dialect, "mysql");
        assert_eq!(config.database.url, "sqlite::memory:");
    }
}
