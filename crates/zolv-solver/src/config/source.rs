use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Result, SolverError};

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From a configuration file
    File,
    /// From environment variable
    Environment(String),
    /// Programmatically set
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// Raw configuration data as found in a JSON file.
///
/// Every field is optional so a file only overrides what it mentions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_resolve: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_mode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_architectures: Option<Vec<String>>,
}

/// Loads configuration from files and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a ZOLV_* environment variable
    pub fn get_zolv_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get a configuration value from environment variable
    /// Converts "foo-bar" to "ZOLV_FOO_BAR"
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        let env_var = Self::env_var_name(key);
        self.get_zolv_env(&env_var)
    }

    /// Name of the environment variable backing a configuration key
    pub fn env_var_name(key: &str) -> String {
        format!("ZOLV_{}", key.replace('-', "_").to_uppercase())
    }

    /// Get boolean value from environment variable
    pub fn get_env_bool(&self, key: &str) -> Option<bool> {
        self.get_env_config(key).map(|val| {
            !matches!(val.to_lowercase().as_str(), "false" | "0" | "no" | "off")
        })
    }

    /// Get unsigned integer value from environment variable
    pub fn get_env_u64(&self, key: &str) -> Option<u64> {
        self.get_env_config(key).and_then(|val| val.parse().ok())
    }

    /// Load configuration from a JSON file.
    ///
    /// A missing file yields an empty configuration.
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("No resolver config at {}, using defaults", path.display());
            return Ok(RawConfig::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| SolverError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: RawConfig = serde_json::from_str(&contents)
            .map_err(|e| SolverError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        Ok(config)
    }
}
