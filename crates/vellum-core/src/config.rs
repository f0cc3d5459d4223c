//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/vellum/config.toml)
//! 3. Environment variables (VELLUM_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "VELLUM";

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "https://spc-8hcz.onrender.com";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Keys accepted by [`Config::set`]
pub const KEYS: &[&str] = &[
    "backend_url",
    "auth_token",
    "local_dir",
    "request_timeout_secs",
    "log_file",
];

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the dashboard backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Bearer token sent with every write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Store content in this directory instead of the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_dir: Option<PathBuf>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Write logs here instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            auth_token: None,
            local_dir: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (VELLUM_BACKEND_URL, VELLUM_AUTH_TOKEN, VELLUM_LOCAL_DIR,
    ///    VELLUM_TIMEOUT_SECS)
    /// 2. Config file (~/.config/vellum/config.toml or VELLUM_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read only the config file, without environment overrides
    ///
    /// Used when editing the file so overrides are not written back.
    pub fn read_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // VELLUM_BACKEND_URL
        if let Ok(val) = std::env::var(format!("{}_BACKEND_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.backend_url = val;
            }
        }

        // VELLUM_AUTH_TOKEN
        if let Ok(val) = std::env::var(format!("{}_AUTH_TOKEN", ENV_PREFIX)) {
            self.auth_token = if val.is_empty() { None } else { Some(val) };
        }

        // VELLUM_LOCAL_DIR
        if let Ok(val) = std::env::var(format!("{}_LOCAL_DIR", ENV_PREFIX)) {
            self.local_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // VELLUM_TIMEOUT_SECS, ignored when not a number
        if let Ok(val) = std::env::var(format!("{}_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.trim().parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    /// Set a value by key, as used by `vellum config set`
    ///
    /// An empty value clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "backend_url" => {
                anyhow::ensure!(!value.is_empty(), "backend_url cannot be empty");
                self.backend_url = value.trim_end_matches('/').to_string();
            }
            "auth_token" => self.auth_token = optional(value),
            "local_dir" => self.local_dir = optional(value).map(PathBuf::from),
            "request_timeout_secs" => {
                self.request_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?;
            }
            "log_file" => self.log_file = optional(value).map(PathBuf::from),
            _ => anyhow::bail!("Unknown config key '{}'. Valid keys: {}", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with VELLUM_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vellum")
            .join("config.toml")
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Human readable description of where content is stored
    pub fn backend_description(&self) -> String {
        match &self.local_dir {
            Some(dir) => format!("local directory {}", dir.display()),
            None => self.backend_url.clone(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "VELLUM_BACKEND_URL",
        "VELLUM_AUTH_TOKEN",
        "VELLUM_LOCAL_DIR",
        "VELLUM_TIMEOUT_SECS",
        "VELLUM_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend_url, "https://spc-8hcz.onrender.com");
        assert!(config.auth_token.is_none());
        assert!(config.local_dir.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_override_backend_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VELLUM_BACKEND_URL", "http://localhost:5000");
        config.apply_env_overrides();
        assert_eq!(config.backend_url, "http://localhost:5000");

        // Empty string keeps the current value
        env::set_var("VELLUM_BACKEND_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.backend_url, "http://localhost:5000");
    }

    #[test]
    fn test_env_override_auth_token() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VELLUM_AUTH_TOKEN", "secret");
        config.apply_env_overrides();
        assert_eq!(config.auth_token.as_deref(), Some("secret"));

        // Empty string clears it
        env::set_var("VELLUM_AUTH_TOKEN", "");
        config.apply_env_overrides();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_env_override_local_dir_and_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("VELLUM_LOCAL_DIR", "/tmp/vellum-test");
        env::set_var("VELLUM_TIMEOUT_SECS", "5");
        config.apply_env_overrides();
        assert_eq!(config.local_dir, Some(PathBuf::from("/tmp/vellum-test")));
        assert_eq!(config.request_timeout_secs, 5);

        env::set_var("VELLUM_TIMEOUT_SECS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            backend_url: "https://cms.example.com".to_string(),
            auth_token: Some("token".to_string()),
            local_dir: None,
            request_timeout_secs: 10,
            log_file: Some(PathBuf::from("/tmp/vellum.log")),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("backend_url"));
        assert!(toml_str.contains("auth_token"));
        assert!(!toml_str.contains("local_dir"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            backend_url = "http://localhost:5000"
            local_dir = "/custom/data"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert_eq!(config.local_dir, Some(PathBuf::from("/custom/data")));
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_and_save_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vellum").join("config.toml");

        let mut config = Config::default();
        config.set("backend_url", "http://localhost:5000/").unwrap();
        config.set("auth_token", "abc").unwrap();
        config.set("request_timeout_secs", "12").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.backend_url, "http://localhost:5000");
        assert_eq!(loaded.auth_token.as_deref(), Some("abc"));
        assert_eq!(loaded.request_timeout_secs, 12);

        config.set("auth_token", "").unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("sync_url", "x").is_err());
        assert!(config.set("request_timeout_secs", "soon").is_err());
        assert!(config.set("backend_url", "").is_err());
    }
}
