//! Configuration management for sqlchat.
//!
//! Handles loading configuration from TOML files, with support for
//! LLM provider settings and a default database path.

use crate::error::{Result, SqlchatError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for sqlchat.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "gemini" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "gemini-2.5-pro").
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlchat")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlchatError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SqlchatError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
[llm]
provider = "gemini"
model = "gemini-2.5-flash"

[database]
path = "patients.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.database.path, Some(PathBuf::from("patients.db")));
    }

    #[test]
    fn test_missing_optional_fields() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.database.path, None);
    }

    #[test]
    fn test_default_llm_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load_from_file(Path::new("/nonexistent/sqlchat.toml")).unwrap();
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_parse_invalid_toml_reports_path() {
        let result = Config::parse_toml("not [ valid", Path::new("bad.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bad.toml"));
    }
}
