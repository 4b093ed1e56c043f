//! Process-wide configuration: backend base URL and injected headers.
//!
//! Resolution order: `APIDESK_BASE_URL` environment variable, then
//! `~/.apidesk/config.yaml`, then the built-in default. The header set is
//! attached to every backend call by the transport client; the default
//! carries the tunnel bypass header the hosted backend expects.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{BASE_URL_ENV, CONFIG_DIR, CONFIG_FILE, DEFAULT_BASE_URL};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("ngrok-skip-browser-warning".to_string(), "true".to_string());
    headers
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            headers: default_headers(),
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    pub fn load() -> Self {
        let mut config = config_path()
            .and_then(|path| match Self::load_file(&path) {
                Ok(config) => Some(config),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Ignoring unreadable config file");
                    None
                }
            })
            .unwrap_or_default();

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config
    }

    /// Read and parse one config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Root of the backend server, without the versioned API prefix.
    /// The health endpoint lives here rather than under `/api/v1`.
    pub fn root_url(&self) -> String {
        self.base_url
            .trim_end_matches('/')
            .trim_end_matches("/api/v1")
            .to_string()
    }
}

fn config_path() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    path.exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(
            config.headers.get("ngrok-skip-browser-warning").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn root_url_strips_the_api_prefix() {
        let config = Config {
            base_url: "https://backend.example.com/api/v1".to_string(),
            ..Config::default()
        };
        assert_eq!(config.root_url(), "https://backend.example.com");
    }

    #[test]
    fn root_url_without_prefix_is_unchanged() {
        let config = Config {
            base_url: "http://localhost:9000".to_string(),
            ..Config::default()
        };
        assert_eq!(config.root_url(), "http://localhost:9000");
    }

    #[test]
    fn load_file_reads_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "base_url: http://10.0.0.2:8080/api/v1\n").unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:8080/api/v1");
        // unspecified fields fall back to defaults
        assert!(!config.headers.is_empty());
    }

    #[test]
    fn load_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, ": not yaml [").unwrap();
        assert!(Config::load_file(&path).is_err());
    }
}
