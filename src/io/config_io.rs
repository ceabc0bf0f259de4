use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

pub const CONFIG_FILE: &str = "config.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--config`: read this file instead of searching
    pub config_file: Option<PathBuf>,
    /// `--token`
    pub token: Option<String>,
    /// `TODOIST_TOKEN`
    pub env_token: Option<String>,
}

impl Overrides {
    /// Overrides with the environment filled in
    pub fn from_env(config_file: Option<PathBuf>, token: Option<String>) -> Self {
        Overrides {
            config_file,
            token,
            env_token: std::env::var("TODOIST_TOKEN").ok(),
        }
    }
}

/// Candidate config files in search order: `$XDG_CONFIG_HOME/todoister/`,
/// `~/.config/todoister/`, then the traditional `~/.todoister.toml`.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    let home = dirs::home_dir();
    match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(xdg) => out.push(PathBuf::from(xdg).join(crate::PROG).join(CONFIG_FILE)),
        None => {
            if let Some(home) = &home {
                out.push(home.join(".config").join(crate::PROG).join(CONFIG_FILE));
            }
        }
    }
    if let Some(home) = &home {
        out.push(home.join(format!(".{}.toml", crate::PROG)));
    }
    out
}

/// Read one config file. A missing file is an error here; callers decide
/// whether that matters.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Build the effective configuration.
///
/// An explicit `--config` file must exist. Otherwise the first existing
/// candidate is used, and no file at all means defaults. Token precedence:
/// file < `TODOIST_TOKEN` < `--token`.
pub fn load_config(overrides: &Overrides) -> Result<Config, ConfigError> {
    let mut config = match &overrides.config_file {
        Some(path) => read_config(path)?,
        None => match config_candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("using config {}", path.display());
                read_config(&path)?
            }
            None => Config::default(),
        },
    };

    for token in [&overrides.env_token, &overrides.token].into_iter().flatten() {
        if !token.trim().is_empty() {
            config.token = Some(token.clone());
        }
    }

    config.cache.dir = config.cache.dir.map(|p| expand_home(&p));
    config.log.name = config.log.name.map(|p| expand_home(&p));
    Ok(config)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
