use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::time::Duration;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language, either a name ("Khmer") or an ISO code ("km")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Remote endpoint configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: API key, sent as the `key` query parameter
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: generateContent URL
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    // @field: Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_gemini_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Remote endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Entries per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of batches in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Mandatory wait before each batch's request, in milliseconds
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff for non rate-limit failures, doubled on each retry
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,

    /// Upper bound for every backoff
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Use the server's Retry-After header on 429 when present
    #[serde(default = "default_true")]
    pub honor_retry_after: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            batch_size: default_batch_size(),
            concurrent_requests: default_concurrent_requests(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            max_retries: default_max_retries(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            honor_retry_after: default_true(),
        }
    }
}

/// Read-only settings consumed by the translation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub concurrent_requests: usize,
    pub inter_batch_delay: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub honor_retry_after: bool,
    pub target_language: String,
    pub api_key: String,
    pub endpoint_url: String,
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline_config()
    }
}

impl PipelineConfig {
    /// Whether an API key is present; without one the pipeline passes entries through untouched
    pub fn is_translation_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "Khmer".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    5
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_inter_batch_delay_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_secs() -> u64 {
    2
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }

        let translation = &self.translation;
        if translation.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        if translation.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }
        if translation.initial_backoff_secs > translation.max_backoff_secs {
            return Err(anyhow!(
                "initial_backoff_secs ({}) cannot exceed max_backoff_secs ({})",
                translation.initial_backoff_secs,
                translation.max_backoff_secs
            ));
        }

        Url::parse(&translation.provider.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", translation.provider.endpoint, e))?;

        // A missing API key is allowed: the pipeline then returns entries untranslated
        Ok(())
    }

    /// Build the pipeline settings, resolving ISO codes to language names for the prompt
    pub fn pipeline_config(&self) -> PipelineConfig {
        let translation = &self.translation;
        PipelineConfig {
            batch_size: translation.batch_size,
            concurrent_requests: translation.concurrent_requests,
            inter_batch_delay: Duration::from_millis(translation.inter_batch_delay_ms),
            max_retries: translation.max_retries,
            initial_backoff: Duration::from_secs(translation.initial_backoff_secs),
            max_backoff: Duration::from_secs(translation.max_backoff_secs),
            honor_retry_after: translation.honor_retry_after,
            target_language: crate::language_utils::resolve_language_name(&self.target_language),
            api_key: translation.provider.api_key.clone(),
            endpoint_url: translation.provider.endpoint.clone(),
            request_timeout: Duration::from_secs(translation.provider.timeout_secs),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
