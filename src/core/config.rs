//! Configuration management for Troupe
//!
//! Supports environment variables, config files, and runtime overrides.
//! Each role's backend is addressed independently via its own endpoint settings.
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
    /// Backend for the planner role (reasoning model)
    pub planner: EndpointConfig,
    /// Backend for the describer role (video description model)
    pub describer: EndpointConfig,
    /// Runtime behavior
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Settings addressing one OpenAI-compatible backend
///
/// Two configs with different base_url/model/api_key triples address two
/// independent models and are never conflated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL including the API prefix, e.g. http://localhost:8005/v1
    pub base_url: String,
    /// Model identifier to request
    pub model: String,
    /// API key; vLLM-style local servers accept "EMPTY"
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Runtime behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum scheduler rounds before a run is cut off
    /// Default: 8
    pub max_rounds: usize,
    /// Whether a message that caused a failed action stays observable
    /// (true = retain for retry, false = discard)
    pub retain_on_failure: bool,
    /// Whether to show debug output
    pub debug: bool,
    /// Stream tokens to stdout as they arrive
    pub stream: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            retain_on_failure: true,
            debug: env::var("TROUPE_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            stream: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: EndpointConfig::planner_default(),
            describer: EndpointConfig::describer_default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl EndpointConfig {
    /// Default planner backend (chain-of-focus reasoning model)
    pub fn planner_default() -> Self {
        Self {
            base_url: env::var("TROUPE_PLANNER_URL")
                .unwrap_or_else(|_| "http://localhost:8005/v1".to_string()),
            model: env::var("TROUPE_PLANNER_MODEL")
                .unwrap_or_else(|_| "CoF-rl-model-7b".to_string()),
            api_key: env::var("TROUPE_PLANNER_API_KEY").unwrap_or_else(|_| "EMPTY".to_string()),
            timeout_secs: 120,
        }
    }

    /// Default describer backend (video description model)
    pub fn describer_default() -> Self {
        Self {
            base_url: env::var("TROUPE_DESCRIBER_URL")
                .unwrap_or_else(|_| "http://localhost:8006/v1".to_string()),
            model: env::var("TROUPE_DESCRIBER_MODEL")
                .unwrap_or_else(|_| "Open-o3-Video".to_string()),
            api_key: env::var("TROUPE_DESCRIBER_API_KEY").unwrap_or_else(|_| "EMPTY".to_string()),
            timeout_secs: 120,
        }
    }

    /// Validate that the base URL parses as an absolute URL
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| TroupeError::config(format!("Invalid base_url '{}': {}", self.base_url, e)))?;
        if self.model.is_empty() {
            return Err(TroupeError::config("model must not be empty"));
        }
        Ok(())
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
    /// Priority: CLI overrides (applied by the caller) > config file >
    /// env vars (consulted by the defaults) > built-in defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
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

        let content = toml::to_string_pretty(self)
            .map_err(|e| TroupeError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| TroupeError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration and return the path
    pub fn save_and_get_path(&self) -> Result<PathBuf> {
        self.save()?;
        Ok(Self::config_file())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Validate both endpoints
    pub fn validate(&self) -> Result<()> {
        self.planner.validate()?;
        self.describer.validate()?;
        Ok(())
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
