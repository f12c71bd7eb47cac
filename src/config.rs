use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::InitError;

/// Configuration for the scraper binary.
///
/// Only infrastructure lives here (WebDriver endpoint, credential file,
/// bind address, wait budgets); the scrape targets themselves are fixed
/// per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// URL for the WebDriver instance used by browser-mode fetches
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Path to the document-store credential file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Address the read API binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Seconds to wait for the target content element to render
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Seconds to wait for a best-effort interaction element (e.g. a
    /// consent banner) before skipping it
    #[serde(default = "default_banner_timeout_secs")]
    pub banner_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            credentials_path: default_credentials_path(),
            bind_addr: default_bind_addr(),
            wait_timeout_secs: default_wait_timeout_secs(),
            banner_timeout_secs: default_banner_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InitError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| InitError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self =
            serde_json::from_str(&contents).map_err(|source| InitError::ConfigFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    /// Override the WebDriver URL with an environment variable if provided
    pub fn apply_env(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for credentials_path
fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

/// Default value for bind_addr
fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

/// Default content wait in seconds
fn default_wait_timeout_secs() -> u64 {
    20
}

/// Default banner wait in seconds
fn default_banner_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.wait_timeout_secs, 20);
        assert_eq!(config.banner_timeout_secs, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"webdriver_url": "http://localhost:9515"}"#).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
    }
}
