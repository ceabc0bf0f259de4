use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.todoist.com/api/v1";

/// Configuration from config.toml, merged with environment and flag overrides.
///
/// Passed explicitly into every entry point that needs it; there is no
/// process-wide configuration state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Todoist API token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the snapshot and schema marker.
    /// Default: the platform cache dir + `todoister`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append log events to this file instead of stderr
    #[serde(default)]
    pub name: Option<PathBuf>,
}

impl Config {
    /// The token, if one is configured and non-blank
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}
