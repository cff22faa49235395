use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::item::Arch;
use super::source::{ConfigLoader, ConfigSource, RawConfig};

/// Configuration surface of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Search timeout in seconds, 0 means unlimited
    #[serde(default)]
    pub timeout_seconds: u64,

    /// Complete the search even when obligations cannot be fulfilled,
    /// recording them as diagnostics instead of failing the path
    #[serde(default)]
    pub force_resolve: bool,

    /// Removals re-check reverse dependencies instead of remove-only semantics
    #[serde(default)]
    pub upgrade_mode: bool,

    /// System architecture (defaults to the host architecture)
    #[serde(default = "default_architecture")]
    pub architecture: String,

    /// Architectures whose incompatibility is ignored
    #[serde(default)]
    pub ignored_architectures: Vec<String>,

    /// Where each value came from
    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

fn default_architecture() -> String {
    std::env::consts::ARCH.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 0,
            force_resolve: false,
            upgrade_mode: false,
            architecture: default_architecture(),
            ignored_architectures: Vec::new(),
            sources: HashMap::new(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build configuration from all sources (defaults, file, env)
    pub fn build<P: AsRef<Path>>(config_file: Option<P>, use_environment: bool) -> Result<Self> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self::default();

        for key in Self::config_keys() {
            config.sources.insert(key.to_string(), ConfigSource::Default);
        }

        if let Some(path) = &config_file {
            let raw = loader.load_config_file(path)?;
            config.merge_raw_config(raw, ConfigSource::File);
        }

        if use_environment {
            config.apply_env_overrides(&loader);
        }

        Ok(config)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let mut config = Self::default();
        config.merge_raw_config(raw, ConfigSource::Command);
        Ok(config)
    }

    /// Load a configuration file, ignoring the environment
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(Some(path), false)
    }

    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    /// The configured system architecture
    pub fn arch(&self) -> Arch {
        Arch::new(&self.architecture)
    }

    /// The ignored architectures as [`Arch`] values
    pub fn ignored_archs(&self) -> Vec<Arch> {
        self.ignored_architectures.iter().map(|a| Arch::new(a)).collect()
    }

    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) {
        if let Some(timeout) = raw.timeout_seconds {
            self.timeout_seconds = timeout;
            self.sources.insert("timeout-seconds".to_string(), source.clone());
        }
        if let Some(force) = raw.force_resolve {
            self.force_resolve = force;
            self.sources.insert("force-resolve".to_string(), source.clone());
        }
        if let Some(upgrade) = raw.upgrade_mode {
            self.upgrade_mode = upgrade;
            self.sources.insert("upgrade-mode".to_string(), source.clone());
        }
        if let Some(arch) = raw.architecture {
            self.architecture = arch;
            self.sources.insert("architecture".to_string(), source.clone());
        }
        if let Some(ignored) = raw.ignored_architectures {
            self.ignored_architectures = ignored;
            self.sources.insert("ignored-architectures".to_string(), source);
        }
    }

    /// Override values from the `ZOLV_*` environment variables
    pub fn apply_env(&mut self) {
        let loader = ConfigLoader::new(true);
        self.apply_env_overrides(&loader);
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) {
        if let Some(timeout) = loader.get_env_u64("solver-timeout") {
            self.timeout_seconds = timeout;
            self.sources.insert(
                "timeout-seconds".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("solver-timeout")),
            );
        }

        if let Some(force) = loader.get_env_bool("force-resolve") {
            self.force_resolve = force;
            self.sources.insert(
                "force-resolve".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("force-resolve")),
            );
        }

        if let Some(upgrade) = loader.get_env_bool("upgrade-mode") {
            self.upgrade_mode = upgrade;
            self.sources.insert(
                "upgrade-mode".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("upgrade-mode")),
            );
        }

        if let Some(arch) = loader.get_env_config("arch") {
            self.architecture = arch;
            self.sources.insert(
                "architecture".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("arch")),
            );
        }
    }

    fn config_keys() -> &'static [&'static str] {
        &[
            "timeout-seconds",
            "force-resolve",
            "upgrade-mode",
            "architecture",
            "ignored-architectures",
        ]
    }
}
