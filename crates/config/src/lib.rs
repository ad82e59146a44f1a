//! Configuration loading, validation, and management for Chatline.
//!
//! Loads configuration from `~/.chatline/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is immutable and handed to the components that need it.

use chatline_core::user::Tier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.chatline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the backend provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Backend provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Model identifier per strategy tier
    #[serde(default)]
    pub models: ModelConfig,

    /// Per-tier message ceilings
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Default retry policy for prompt commands
    #[serde(default)]
    pub retry: RetryConfig,

    /// Agent loop limits
    #[serde(default)]
    pub agent: AgentLoopConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("models", &self.models)
            .field("quota", &self.quota)
            .field("retry", &self.retry)
            .field("agent", &self.agent)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "gemini".into()
}
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: default_api_url(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Model identifiers for the three strategy tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_standard_model")]
    pub standard: String,

    #[serde(default = "default_advanced_model")]
    pub advanced: String,

    #[serde(default = "default_expert_model")]
    pub expert: String,
}

fn default_standard_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_advanced_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_expert_model() -> String {
    "gemini-2.5-pro-exp-03-25".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            standard: default_standard_model(),
            advanced: default_advanced_model(),
            expert: default_expert_model(),
        }
    }
}

/// Maximum number of messages a single chat may hold, per author tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_subscribed_messages")]
    pub subscribed_messages: usize,

    #[serde(default = "default_unsubscribed_messages")]
    pub unsubscribed_messages: usize,
}

fn default_subscribed_messages() -> usize {
    150
}
fn default_unsubscribed_messages() -> usize {
    10
}

impl QuotaConfig {
    pub fn ceiling(&self, tier: Tier) -> usize {
        match tier {
            Tier::Subscribed => self.subscribed_messages,
            Tier::Unsubscribed => self.unsubscribed_messages,
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            subscribed_messages: default_subscribed_messages(),
            unsubscribed_messages: default_unsubscribed_messages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Retry only transient failures instead of every failure
    #[serde(default)]
    pub transient_only: bool,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    1000
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            transient_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLoopConfig {
    /// Maximum tool-call rounds per prompt
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
}

fn default_max_tool_iterations() -> u32 {
    8
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatline/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CHATLINE_API_KEY` (highest priority), then `GEMINI_API_KEY`
    /// - `CHATLINE_API_URL` overrides the provider base URL
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("CHATLINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("CHATLINE_API_URL") {
            config.provider.api_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatline")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        if self.quota.subscribed_messages == 0 || self.quota.unsubscribed_messages == 0 {
            return Err(ConfigError::ValidationError(
                "quota ceilings must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Render this configuration as TOML, with the API key left out.
    pub fn to_toml(&self) -> String {
        let public = Self {
            api_key: None,
            ..self.clone()
        };
        toml::to_string_pretty(&public).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            models: ModelConfig::default(),
            quota: QuotaConfig::default(),
            retry: RetryConfig::default(),
            agent: AgentLoopConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for chatline_core::Error {
    fn from(e: ConfigError) -> Self {
        chatline_core::Error::Config {
            message: e.to_string(),
        }
    }
}
