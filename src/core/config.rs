//! Configuration management for Troupe
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/troupe/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, TroupeError};

/// Main configuration for Troupe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hosted API configuration
    pub api: ApiConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Session behavior
    #[serde(default)]
    pub session: SessionConfig,
    /// Streaming configuration
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// OpenRouter endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Bearer token; taken from OPENROUTER_API_KEY when absent here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model selection and sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier in provider/model form
    pub name: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional completion length cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Session behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Registry key of the agent that answers unrouted messages
    pub default_agent: String,
    /// Maximum conversation history length (storage limit)
    pub max_history: usize,
    /// Number of recent messages to include in the model's context
    pub context_window: usize,
    /// Maximum tool-loop rounds for a coordinating agent turn
    pub max_turns: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Whether to stream responses in real-time
    pub enabled: bool,
    /// Print tokens as they arrive (vs buffering)
    pub print_tokens: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            model: ModelConfig::default(),
            session: SessionConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            api_key: env::var("OPENROUTER_API_KEY").ok(),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: env::var("TROUPE_MODEL").unwrap_or_else(|_| "openai/gpt-4.1".to_string()),
            temperature: 0.1,
            max_tokens: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_agent: env::var("TROUPE_DEFAULT_AGENT").unwrap_or_else(|_| "manager".to_string()),
            max_history: 1000,
            context_window: 20,
            max_turns: 8,
            debug: env::var("TROUPE_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("TROUPE_STREAMING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            print_tokens: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("troupe")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Pick up a .env file if one exists
        let _ = dotenvy::dotenv();

        if let Ok(mut config) = Self::load_from_file() {
            // The key never lives in the file by default; env still wins
            if config.api.api_key.is_none() {
                config.api.api_key = env::var("OPENROUTER_API_KEY").ok();
            }
            return config;
        }

        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TroupeError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TroupeError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TroupeError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| TroupeError::config(format!("Failed to create config dir: {}", e)))?;
        }

        // The API key stays out of the file; it belongs in the environment
        let mut on_disk = self.clone();
        on_disk.api.api_key = None;

        let content = toml::to_string_pretty(&on_disk)
            .map_err(|e| TroupeError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| TroupeError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// The bearer token, or an error pointing at the environment variable
    pub fn require_api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TroupeError::MissingApiKey)
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api.base_url.trim_end_matches('/'))
    }
}
