//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the backend API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Environment variable that overrides the configured base URL
pub const BASE_URL_ENV: &str = "APIDESK_BASE_URL";

/// Config directory name under the home directory
pub const CONFIG_DIR: &str = ".apidesk";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Application name
#[allow(dead_code)]
pub const APP_NAME: &str = "Apidesk";

/// Application version
#[allow(dead_code)]
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
