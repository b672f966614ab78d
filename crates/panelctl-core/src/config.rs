//! Configuration resolution for panelctl.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/panelctl/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete panelctl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the panel API.
    pub api_url: String,
    /// Default `RUST_LOG` filter when the env-var is not set.
    pub log_level: String,
    /// Override for the session token file location.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
            session_path: None,
        }
    }
}

impl Config {
    /// Resolve the session token file: the configured override, or
    /// `session.json` next to the global settings file.
    pub fn session_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.session_path {
            return Some(path.clone());
        }
        global_config_path().map(|p| p.with_file_name("session.json"))
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            config = load_config_file(&global_path)?;
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".panelctl").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/panelctl/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("panelctl").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("PANELCTL_API_URL") {
        config.api_url = val;
    }
    if let Ok(val) = std::env::var("PANELCTL_LOG_LEVEL") {
        config.log_level = val;
    }
    if let Ok(val) = std::env::var("PANELCTL_SESSION_PATH") {
        config.session_path = Some(PathBuf::from(val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_localhost() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn explicit_session_path_wins() {
        let config = Config {
            session_path: Some(PathBuf::from("/tmp/panelctl-session.json")),
            ..Config::default()
        };
        assert_eq!(
            config.session_file(),
            Some(PathBuf::from("/tmp/panelctl-session.json"))
        );
    }

    #[test]
    fn config_file_parses_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api_url":"https://panel.example.com","log_level":"debug"}"#)
            .unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.api_url, "https://panel.example.com");
        assert_eq!(config.log_level, "debug");
        assert!(config.session_path.is_none());
    }
}
