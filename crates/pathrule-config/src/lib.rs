//! Configuration for pathrule engine callers.
//!
//! Load evaluation limits and a default external context from TOML or YAML
//! files without code changes. The engine itself never reads configuration;
//! callers enforce the limits (the engine does not bound path enumeration)
//! and pass the context into every entry point explicitly.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use pathrule_config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [limits]
//!     max_combinations = 10000
//!
//!     [context]
//!     inventory = 120
//!     user_level = 3
//!     date = "2026-08-07"
//!
//!     [context.custom]
//!     beta = true
//! "#).unwrap();
//!
//! assert_eq!(config.max_combinations(), Some(10000));
//! let ctx = config.context();
//! assert_eq!(ctx.inventory, 120);
//! assert!(ctx.custom.contains_key("beta"));
//! ```
//!
//! Use default config when the file is missing:
//!
//! ```
//! use pathrule_config::EngineConfig;
//!
//! let config = EngineConfig::load("pathrule.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use pathrule_core::ExternalContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;


/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main engine-caller configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Evaluation limits enforced by the caller.
    #[serde(default)]
    pub limits: Option<LimitsConfig>,

    /// Default external context values.
    #[serde(default)]
    pub context: Option<ContextConfig>,
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the combination cap.
    pub fn with_max_combinations(mut self, max_combinations: u64) -> Self {
        self.limits = Some(LimitsConfig {
            max_combinations: Some(max_combinations),
        });
        self
    }

    /// Returns the combination cap, if configured.
    ///
    /// Callers compare this against `combination_count` before enumerating;
    /// the engine itself never bounds the product.
    pub fn max_combinations(&self) -> Option<u64> {
        self.limits.as_ref().and_then(|l| l.max_combinations)
    }

    /// Materializes the configured default context, with unset fields at
    /// their neutral defaults.
    pub fn context(&self) -> ExternalContext {
        let Some(config) = &self.context else {
            return ExternalContext::default();
        };
        let mut ctx = ExternalContext::default();
        if let Some(inventory) = config.inventory {
            ctx.inventory = inventory;
        }
        if let Some(user_level) = config.user_level {
            ctx.user_level = user_level;
        }
        if let Some(date) = &config.date {
            ctx.date = date.clone();
        }
        if let Some(time) = &config.time {
            ctx.time = time.clone();
        }
        ctx.custom = config.custom.clone();
        ctx
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_combinations() == Some(0) {
            return Err(ConfigError::Invalid(
                "max_combinations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Evaluation limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LimitsConfig {
    /// Maximum number of paths the caller is willing to enumerate.
    pub max_combinations: Option<u64>,
}

/// Default external context values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextConfig {
    pub inventory: Option<i64>,
    pub user_level: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, Value>,
}
