//! Store configuration and application constants.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Surgery Tracker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker left in unconfigured remote settings (e.g. `YOUR_API_KEY`).
pub const PLACEHOLDER_MARKER: &str = "YOUR_";

/// Default HTTP timeout for the remote store.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "surgery_tracker_core=info,surgery_tracker_outreach=info"
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote realtime-database settings, keyed like the web app config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default, rename = "databaseURL", alias = "databaseUrl")]
    pub database_url: Option<String>,
    /// Token sent as the `auth` query parameter
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl StoreConfig {
    /// Parse from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn values(&self) -> impl Iterator<Item = &str> {
        [
            &self.api_key,
            &self.auth_domain,
            &self.project_id,
            &self.storage_bucket,
            &self.messaging_sender_id,
            &self.app_id,
            &self.database_url,
            &self.auth_token,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
    }

    /// Whether any value is still a `YOUR_...` placeholder.
    pub fn has_placeholders(&self) -> bool {
        self.values().any(|v| v.contains(PLACEHOLDER_MARKER))
    }

    /// Remote store is usable: a database URL is set and nothing is a placeholder.
    pub fn is_remote_configured(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
            && !self.has_placeholders()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS)
    }
}
