use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const API_URL_ENV: &str = "REPORT_TUI_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTuiConfig {
    /// Incident reports collection URL, e.g. "http://localhost:8080/ims/api/incident_reports"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Whether the page may be edited once a report has loaded
    #[serde(default = "default_editing_allowed")]
    pub editing_allowed: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Author recorded on entries written to the dev backend
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:8080/ims/api/incident_reports".to_string()
}

fn default_editing_allowed() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_author() -> String {
    "dev".to_string()
}

impl Default for ReportTuiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            editing_allowed: default_editing_allowed(),
            request_timeout_secs: default_request_timeout_secs(),
            author: default_author(),
            auth_token: None,
        }
    }
}

impl ReportTuiConfig {
    fn root_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("report-tui"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::root_path()?.join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::root_path()?.join("report-tui.log"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            Self::parse(&raw)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(api_url) = std::env::var(API_URL_ENV) {
            config.api_url = api_url;
        }
        Ok(config)
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
