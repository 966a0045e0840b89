//! Configuration management for StackScroll.
//!
//! Loads configuration from ${STACKSCROLL_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding `[backend] url`.
pub const BACKEND_URL_ENV: &str = "STACKSCROLL_SUPABASE_URL";
/// Env var overriding `[backend] anon_key`.
pub const ANON_KEY_ENV: &str = "STACKSCROLL_SUPABASE_ANON_KEY";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for StackScroll configuration and data directories.
    //!
    //! STACKSCROLL_HOME resolution order:
    //! 1. STACKSCROLL_HOME environment variable (if set)
    //! 2. ~/.config/stackscroll (default)

    use std::path::PathBuf;

    /// Returns the StackScroll home directory.
    pub fn stackscroll_home() -> PathBuf {
        if let Ok(home) = std::env::var("STACKSCROLL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".stackscroll"),
            |h| h.join(".config").join("stackscroll"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        stackscroll_home().join("config.toml")
    }

    /// Returns the path to the persisted auth session.
    pub fn session_path() -> PathBuf {
        stackscroll_home().join("session.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        stackscroll_home().join("logs")
    }
}

/// Hosted backend configuration (`[backend]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://<project>.supabase.co`.
    pub url: Option<String>,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: Option<String>,
    /// Table holding the articles.
    pub table: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            table: Config::DEFAULT_TABLE.to_string(),
        }
    }
}

/// Share link configuration (`[share]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Origin prepended to `/blog/<id>`.
    pub origin: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: Config::DEFAULT_SHARE_ORIGIN.to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default log filter when `STACKSCROLL_LOG` is unset.
    pub log_level: String,

    /// Hosted backend settings.
    pub backend: BackendConfig,

    /// Share link settings.
    pub share: ShareConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            backend: BackendConfig::default(),
            share: ShareConfig::default(),
        }
    }
}

/// Fully resolved backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Project URL without a trailing slash.
    pub url: String,
    pub anon_key: String,
    pub table: String,
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";
    const DEFAULT_TABLE: &str = "posts";
    const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:5173";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves backend settings with precedence: env > config.
    ///
    /// # Errors
    /// Returns an error if the URL or anon key is missing, or the URL is malformed.
    pub fn backend_settings(&self) -> Result<BackendSettings> {
        let url = resolve_setting(self.backend.url.as_deref(), BACKEND_URL_ENV).with_context(
            || format!("No backend URL configured. Set {BACKEND_URL_ENV} or url in [backend]."),
        )?;
        url::Url::parse(&url).with_context(|| format!("Invalid backend URL: {url}"))?;

        let anon_key = resolve_setting(self.backend.anon_key.as_deref(), ANON_KEY_ENV)
            .with_context(|| {
                format!("No anon key configured. Set {ANON_KEY_ENV} or anon_key in [backend].")
            })?;

        let table = match self.backend.table.trim() {
            "" => Self::DEFAULT_TABLE.to_string(),
            table => table.to_string(),
        };

        Ok(BackendSettings {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            table,
        })
    }

    /// Returns the log filter from config, falling back to the default level.
    pub fn log_filter(&self) -> &str {
        match self.log_level.trim() {
            "" => Self::DEFAULT_LOG_LEVEL,
            level => level,
        }
    }
}

/// Returns the first non-empty value of: env var, config value.
fn resolve_setting(config_value: Option<&str>, env_var: &str) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    config_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend.table, "posts");
        assert_eq!(config.share.origin, "http://localhost:5173");
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.backend.table, "posts");
        assert!(config.backend.url.is_none());
        assert_eq!(config.share.origin, Config::default().share.origin);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::init(&path).unwrap();
        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_backend_settings_from_config() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            url = "https://example.supabase.co/"
            anon_key = "anon"
            table = "articles"
            "#,
        )
        .unwrap();

        // Env overrides would shadow the file values; only assert when unset.
        if std::env::var(BACKEND_URL_ENV).is_err() && std::env::var(ANON_KEY_ENV).is_err() {
            let settings = config.backend_settings().unwrap();
            assert_eq!(settings.url, "https://example.supabase.co");
            assert_eq!(settings.anon_key, "anon");
            assert_eq!(settings.table, "articles");
        }
    }

    #[test]
    fn test_resolve_setting_ignores_blank_config() {
        assert_eq!(
            resolve_setting(Some("   "), "STACKSCROLL_TEST_UNSET_VAR"),
            None
        );
        assert_eq!(
            resolve_setting(Some(" value "), "STACKSCROLL_TEST_UNSET_VAR"),
            Some("value".to_string())
        );
    }
}
