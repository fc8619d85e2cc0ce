//! Configuration loading for CineMind
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--config, --host, --port)
//! 2. Environment variables (CINEMIND_CONFIG, CINEMIND_TMDB_API_KEY, CINEMIND_LLM_API_KEY)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: a warning is logged and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CINEMIND_CONFIG";
/// Environment variable holding the TMDB API key
pub const TMDB_API_KEY_ENV: &str = "CINEMIND_TMDB_API_KEY";
/// Environment variable holding the language model API key
pub const LLM_API_KEY_ENV: &str = "CINEMIND_LLM_API_KEY";

/// Complete configuration file layout
///
/// Every section is optional in the file; absent sections fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// TMDB catalog API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API key (ENV overrides this value)
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_image_base_url")]
    pub image_base_url: String,
    /// Language passed to every TMDB query
    #[serde(default = "default_tmdb_language")]
    pub language: String,
    /// Upper bound on review pages fetched per movie
    #[serde(default = "default_max_review_pages")]
    pub max_review_pages: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

/// Language model (OpenAI-compatible chat completions) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (ENV overrides this value)
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_llm_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Lexicon extensions and keyword output size for the sentiment scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub extra_positive: Vec<String>,
    #[serde(default)]
    pub extra_negative: Vec<String>,
    /// Number of aggregated keywords reported per movie
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
}

/// Rating job bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Finished jobs older than this are pruned
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_language() -> String {
    "zh-CN".to_string()
}

fn default_max_review_pages() -> u32 {
    5
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    20
}

fn default_llm_base_url() -> String {
    "https://api.moonshot.cn/v1".to_string()
}

fn default_llm_model() -> String {
    "moonshot-v1-8k".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_llm_timeout_seconds() -> u64 {
    120
}

fn default_keyword_limit() -> usize {
    20
}

fn default_retention_seconds() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            language: default_tmdb_language(),
            max_review_pages: default_max_review_pages(),
            timeout_seconds: default_timeout_seconds(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_seconds: default_llm_timeout_seconds(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            extra_positive: Vec::new(),
            extra_negative: Vec::new(),
            keyword_limit: default_keyword_limit(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            retention_seconds: default_retention_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Resolve, read and finalize configuration
    ///
    /// Applies the full priority chain: config path (CLI → ENV → default
    /// location), file contents (or defaults when missing), then API key
    /// overrides from the environment.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path);
        let mut config = match &path {
            Some(path) => load_toml_config(path)?,
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                TomlConfig::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Replace API keys with environment values where present
    pub fn apply_env_overrides(&mut self) {
        self.tmdb.api_key = resolve_api_key(TMDB_API_KEY_ENV, self.tmdb.api_key.as_deref(), "TMDB");
        self.llm.api_key = resolve_api_key(LLM_API_KEY_ENV, self.llm.api_key.as_deref(), "LLM");
    }

    /// True when both external services have usable credentials
    pub fn has_api_keys(&self) -> bool {
        self.tmdb.api_key.as_deref().is_some_and(is_valid_key)
            && self.llm.api_key.as_deref().is_some_and(is_valid_key)
    }
}

/// Determine which config file to read
///
/// **Priority:** CLI argument → `CINEMIND_CONFIG` → `<config_dir>/cinemind/config.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Platform config location, e.g. `~/.config/cinemind/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cinemind").join("config.toml"))
}

/// Read a TOML config file
///
/// Missing file → warning + defaults. Unreadable or malformed file → error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found: {} (using built-in defaults)",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = TomlConfig::from_toml_str(&content)?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Resolve an API key from environment then TOML
///
/// **Priority:** ENV → TOML. Blank values are ignored.
pub fn resolve_api_key(env_var: &str, toml_value: Option<&str>, label: &str) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Some(key.to_string());
    }

    warn!(
        "{} API key not configured (set {} or the TOML api_key field)",
        label, env_var
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.tmdb.max_review_pages, 5);
        assert_eq!(config.tmdb.language, "zh-CN");
        assert_eq!(config.llm.model, "moonshot-v1-8k");
        assert_eq!(config.sentiment.keyword_limit, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [server]
            port = 9100

            [llm]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.moonshot.cn/v1");
        assert_eq!(config.jobs.retention_seconds, 3600);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let result = TomlConfig::from_toml_str("[server\nport = ");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_unreadable_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_toml_config(dir.path()).unwrap_err();

        assert!(matches!(err, Error::ConfigRead { ref path, .. } if path == dir.path()));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_has_api_keys_requires_both() {
        let mut config = TomlConfig::default();
        assert!(!config.has_api_keys());
        config.tmdb.api_key = Some("tmdb".to_string());
        assert!(!config.has_api_keys());
        config.llm.api_key = Some(" ".to_string());
        assert!(!config.has_api_keys());
        config.llm.api_key = Some("llm".to_string());
        assert!(config.has_api_keys());
    }
}
