use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ChatError, Result};

pub const DEFAULT_BACKEND_URL: &str = "https://chatbuddy-7i8s.onrender.com";

/// Environment variable that overrides the configured backend address
pub const BACKEND_URL_ENV: &str = "CALM_CHAT_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub backend_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<config dir>/calm-chat/config.json`, falling back to defaults
    /// when it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::new()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("reading {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| ChatError::Config(format!("parsing {}: {e}", path.display())))?;
        Ok(config)
    }

    /// Pick the backend address: explicit override, then the environment,
    /// then the file, then the built-in default
    pub fn resolve_backend_url(&self, override_url: Option<&str>) -> String {
        let from_env = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        self.pick_backend_url(override_url, from_env)
    }

    fn pick_backend_url(&self, override_url: Option<&str>, from_env: Option<String>) -> String {
        override_url
            .map(str::to_string)
            .or(from_env)
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calm-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.pick_backend_url(None, None), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"backend_url": "http://localhost:5000", "request_timeout_secs": 30}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_means_transport_default() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_backend_url_precedence() {
        let config = Config {
            backend_url: Some("http://from-file".into()),
            ..Config::default()
        };

        assert_eq!(
            config.pick_backend_url(Some("http://from-flag"), Some("http://from-env".into())),
            "http://from-flag"
        );
        assert_eq!(
            config.pick_backend_url(None, Some("http://from-env".into())),
            "http://from-env"
        );
        assert_eq!(config.pick_backend_url(None, None), "http://from-file");
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(ChatError::Config(_))
        ));
    }
}
