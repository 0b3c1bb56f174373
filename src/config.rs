//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `~/.skald/config.toml` (user)
//! 3. `/etc/skald/config.toml` (system)
//! 4. built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.skald/secrets.toml` (user, must be 0600)
//! 2. `OPENAI_API_KEY` environment variable (a `.env` file in the working
//!    directory is loaded first, see [`load_dotenv`])

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::batch::{DEFAULT_BATCH_ITEMS, MAX_BATCH_ITEMS};
use crate::cache::CacheConfig;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::{Result, SkaldError};

/// Model identifiers offered to the user.
pub const SUPPORTED_MODELS: &[&str] = &["claude-3.5-haiku", "gpt-4o", "gpt-4o-mini"];

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";

/// Skald configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat-completions API (default: OpenAI).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; unset leaves the HTTP client default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Model used when none is given on the command line.
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            default_model: default_model(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Content cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Maximum cached generations (default: 100).
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
    /// Seconds an entry stays valid after insertion (default: 3600).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_entries() -> u64 {
    100
}

fn default_cache_ttl() -> u64 {
    3600
}

/// History database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// SQLite file (default: `content_history.db` in the working directory).
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("content_history.db")
}

/// Batch mode settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Items processed per batch when not overridden (default: 3, max 10).
    #[serde(default = "default_batch_items")]
    pub max_items: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_items: default_batch_items(),
        }
    }
}

fn default_batch_items() -> usize {
    DEFAULT_BATCH_ITEMS
}

/// Artifact output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory markdown artifacts are written to; unset disables writing.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Template overlay settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesConfig {
    /// JSON file with extra or replacement templates.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first file found in the
    /// user and system locations is used, falling back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            SkaldError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SkaldError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".skald").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/skald/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Reject values the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BATCH_ITEMS).contains(&self.batch.max_items) {
            return Err(SkaldError::Configuration(format!(
                "batch.max_items must be between 1 and {MAX_BATCH_ITEMS}, got {}",
                self.batch.max_items
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(SkaldError::Configuration(
                "cache.max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Content cache configuration derived from `[cache]`.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .ttl(Duration::from_secs(self.cache.ttl_secs))
    }

    /// API base URL, with `OPENAI_API_BASE` taking precedence over the file.
    pub fn api_base_url(&self) -> String {
        self.api_base_url_with(std::env::var(API_BASE_ENV).ok())
    }

    fn api_base_url_with(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    /// Per-request timeout, if configured.
    pub fn api_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }
}

/// Secrets configuration (API key).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from `~/.skald/secrets.toml`, checking permissions.
    ///
    /// Returns empty secrets if no file exists (the key may come from env).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".skald").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }
        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SkaldError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(SkaldError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// API key from the secrets file, falling back to `OPENAI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Load environment variables from a `.env` file in the working directory.
///
/// A missing file is fine; a malformed one is logged and ignored.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to load .env file: {e}"),
    }
}
