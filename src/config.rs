//! Configuration for the pipeline board, read from `.pipeline/pipeline.toml`.
//!
//! Layering is file → environment → CLI. Environment overrides:
//! - `PIPELINE_API_URL`: REST base URL
//! - `PIPELINE_TIMEOUT_SECS`: request timeout
//! - `PIPELINE_LOG_FORMAT`: `pretty` or `json`
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3002/api/v1"
//! timeout_secs = 30
//!
//! [cache]
//! stale_secs = 30
//!
//! [logging]
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR: &str = ".pipeline";
pub const CONFIG_FILE: &str = "pipeline.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

/// REST backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3002/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Request cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// How long a fetched opportunity list is served without refetching
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,
}

fn default_stale_secs() -> u64 {
    30
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            stale_secs: default_stale_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
}

/// Root of `pipeline.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl PipelineToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse pipeline.toml")
    }

    /// Load from `<dir>/pipeline.toml`, or defaults if the file doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize pipeline.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Return a list of problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            errors.push("api.timeout_secs must be greater than 0".to_string());
        }
        errors
    }
}

/// Effective configuration after environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub project_dir: PathBuf,
    pub toml: PipelineToml,
    api_url_override: Option<String>,
}

impl PipelineConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let toml = PipelineToml::load_or_default(&project_dir.join(CONFIG_DIR))?;
        Ok(Self {
            project_dir,
            toml,
            api_url_override: None,
        })
    }

    /// Apply a CLI `--api-url` override on top of file and environment.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url_override = api_url;
        self
    }

    pub fn config_dir(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.config_dir().join("session.json")
    }

    /// Base URL with any trailing slash removed. CLI beats `PIPELINE_API_URL`,
    /// which beats the file.
    pub fn api_base_url(&self) -> String {
        self.api_url_override
            .clone()
            .or_else(|| {
                std::env::var("PIPELINE_API_URL")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .unwrap_or_else(|| self.toml.api.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = std::env::var("PIPELINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(self.toml.api.timeout_secs);
        Duration::from_secs(secs)
    }

    pub fn cache_stale_time(&self) -> Duration {
        Duration::from_secs(self.toml.cache.stale_secs)
    }

    pub fn log_format(&self) -> LogFormat {
        std::env::var("PIPELINE_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.toml.logging.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let toml = PipelineToml::parse("").unwrap();
        assert_eq!(toml.api.base_url, "http://localhost:3002/api/v1");
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.cache.stale_secs, 30);
        assert_eq!(toml.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_parse_full_file() {
        let toml = PipelineToml::parse(
            r#"
[api]
base_url = "https://crm.example.com/api/v1"
timeout_secs = 5

[cache]
stale_secs = 0

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(toml.api.base_url, "https://crm.example.com/api/v1");
        assert_eq!(toml.api.timeout_secs, 5);
        assert_eq!(toml.cache.stale_secs, 0);
        assert_eq!(toml.logging.format, LogFormat::Json);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_log_format() {
        assert!(PipelineToml::parse("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_validate_reports_bad_values() {
        let mut toml = PipelineToml::default();
        toml.api.base_url = "localhost:3002".to_string();
        toml.api.timeout_secs = 0;
        let errors = toml.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("base_url"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut toml = PipelineToml::default();
        toml.cache.stale_secs = 90;
        toml.save(&path).unwrap();
        let loaded = PipelineToml::load_or_default(dir.path()).unwrap();
        assert_eq!(loaded.cache.stale_secs, 90);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.toml.api.timeout_secs, 30);
        assert_eq!(config.session_path(), dir.path().join(".pipeline/session.json"));
    }

    #[test]
    fn test_cli_override_strips_trailing_slash() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path().to_path_buf())
            .unwrap()
            .with_api_url(Some("http://127.0.0.1:9/api/v1/".to_string()));
        assert_eq!(config.api_base_url(), "http://127.0.0.1:9/api/v1");
    }
}
