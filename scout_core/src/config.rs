//! Runtime settings and provider credentials.
//!
//! Settings come from `~/.config/scout/config.yaml` when present, with
//! environment variables layered on top. Everything has a default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 10;

pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_SUMMARIZE_TIMEOUT_SECS: u64 = 30;

/// Local models are slower to answer
pub const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_CACHE_EXPIRY_HOURS: u64 = 24;

pub const DEFAULT_CACHE_MAX_SIZE_MB: u64 = 100;

pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    #[serde(default = "default_summarize_timeout")]
    pub summarize_timeout_secs: u64,

    #[serde(default = "default_ollama_timeout")]
    pub ollama_timeout_secs: u64,

    #[serde(default = "default_cache_expiry")]
    pub cache_expiry_hours: u64,

    #[serde(default = "default_cache_max_size")]
    pub cache_max_size_mb: u64,

    /// Upper bound on the concurrent worker pool
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// Cache root (default: platform cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_enable_cache")]
    pub enable_cache: bool,

    /// Add a trend section to research reports
    #[serde(default = "default_enable_trend_analysis")]
    pub enable_trend_analysis: bool,
}

fn default_max_search_results() -> usize {
    DEFAULT_MAX_SEARCH_RESULTS
}

fn default_search_timeout() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_SECS
}

fn default_summarize_timeout() -> u64 {
    DEFAULT_SUMMARIZE_TIMEOUT_SECS
}

fn default_ollama_timeout() -> u64 {
    DEFAULT_OLLAMA_TIMEOUT_SECS
}

fn default_cache_expiry() -> u64 {
    DEFAULT_CACHE_EXPIRY_HOURS
}

fn default_cache_max_size() -> u64 {
    DEFAULT_CACHE_MAX_SIZE_MB
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_ollama_base_url() -> String {
    DEFAULT_OLLAMA_BASE_URL.to_string()
}

fn default_enable_cache() -> bool {
    true
}

fn default_enable_trend_analysis() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            summarize_timeout_secs: DEFAULT_SUMMARIZE_TIMEOUT_SECS,
            ollama_timeout_secs: DEFAULT_OLLAMA_TIMEOUT_SECS,
            cache_expiry_hours: DEFAULT_CACHE_EXPIRY_HOURS,
            cache_max_size_mb: DEFAULT_CACHE_MAX_SIZE_MB,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            temperature: DEFAULT_TEMPERATURE,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            cache_dir: None,
            enable_cache: true,
            enable_trend_analysis: true,
        }
    }
}

impl Settings {
    /// Load from the default settings file, then apply environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = SettingsStore::new_default().load()?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides from a variable lookup. Unparseable values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MAX_SEARCH_RESULTS").and_then(|v| v.trim().parse().ok()) {
            self.max_search_results = v;
        }
        if let Some(v) = lookup("SEARCH_TIMEOUT").and_then(|v| v.trim().parse().ok()) {
            self.search_timeout_secs = v;
        }
        if let Some(v) = lookup("CACHE_EXPIRY_HOURS").and_then(|v| v.trim().parse().ok()) {
            self.cache_expiry_hours = v;
        }
        if let Some(v) = lookup("MAX_CONCURRENT_REQUESTS").and_then(|v| v.trim().parse().ok()) {
            self.max_concurrent_requests = v;
        }
        if let Some(v) = lookup("TEMPERATURE").and_then(|v| v.trim().parse().ok()) {
            self.temperature = v;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.ollama_base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("SCOUT_CACHE_DIR").filter(|v| !v.trim().is_empty()) {
            self.cache_dir = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = lookup("ENABLE_TREND_ANALYSIS") {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => self.enable_trend_analysis = true,
                "false" | "0" | "no" => self.enable_trend_analysis = false,
                _ => {}
            }
        }
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs.max(1))
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_secs(self.summarize_timeout_secs.max(1))
    }

    pub fn ollama_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama_timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_hours * 3600)
    }

    pub fn cache_max_bytes(&self) -> u64 {
        self.cache_max_size_mb * 1024 * 1024
    }

    /// Size of the worker pool for `n` concurrent provider calls.
    pub fn pool_size(&self, n: usize) -> usize {
        self.max_concurrent_requests.max(1).min(n.max(1))
    }

    /// Resolved cache root.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("scout")
        })
    }
}

// ============================================================================
// SettingsStore
// ============================================================================

/// YAML-backed settings file.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new_default() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("scout").join("config.yaml"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the settings file, returning defaults when it doesn't exist.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| SettingsError::Io(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }
        let content =
            serde_yaml::to_string(settings).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<SettingsError> for crate::error::ProviderError {
    fn from(err: SettingsError) -> Self {
        crate::error::ProviderError::Config(err.to_string())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Environment variables consulted for provider credentials.
pub const CREDENTIAL_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "ANTHROPIC_API_KEY",
    "PERPLEXITY_API_KEY",
    "HUGGINGFACE_API_KEY",
    "COHERE_API_KEY",
    "TOGETHER_API_KEY",
    "OLLAMA_ENABLED",
    "EXA_API_KEY",
    "TAVILY_API_KEY",
    "SERPAPI_API_KEY",
    "SEARCHAPI_KEY",
    "YOU_API_KEY",
    "UNSPLASH_ACCESS_KEY",
    "PIXABAY_API_KEY",
    "FRED_API_KEY",
    "WORLD_BANK_API_ENABLED",
];

/// Collect known credential variables from the process environment.
pub fn credentials_from_env() -> HashMap<String, String> {
    credentials_from(|key| std::env::var(key).ok())
}

pub fn credentials_from<F>(lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_VARS
        .iter()
        .filter_map(|key| lookup(key).map(|value| (key.to_string(), value.trim().to_string())))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

/// Mask a secret for display, keeping a short prefix.
pub fn mask_secret(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    if value.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

// ============================================================================
// Tests
// ============================================================================
