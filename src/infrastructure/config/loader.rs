use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::logging::{LogFormat, RotationPolicy};

/// Project-local configuration file, merged when present
pub const DEFAULT_CONFIG_FILE: &str = "perf-operator.yaml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "PERF_OPERATOR_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid unavailable_requeue_secs: {0}. Must be at least 1")]
    InvalidRequeue(u64),

    #[error("Invalid workers: {0}. Must be at least 1")]
    InvalidWorkers(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Secret name for {0} credentials cannot be empty")]
    EmptySecretName(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. perf-operator.yaml in the working directory (optional)
    /// 3. The file passed with `--config` (optional)
    /// 4. Environment variables (PERF_OPERATOR_* prefix, `__` for nesting)
    pub fn load(config_file: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(DEFAULT_CONFIG_FILE));

        if let Some(path) = config_file {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.perf.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.perf.timeout_secs));
        }

        if config.reconcile.unavailable_requeue_secs == 0 {
            return Err(ConfigError::InvalidRequeue(
                config.reconcile.unavailable_requeue_secs,
            ));
        }

        if config.reconcile.workers == 0 {
            return Err(ConfigError::InvalidWorkers(config.reconcile.workers));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        config
            .logging
            .format
            .parse::<LogFormat>()
            .map_err(ConfigError::InvalidLogFormat)?;
        config
            .logging
            .rotation
            .parse::<RotationPolicy>()
            .map_err(ConfigError::InvalidRotation)?;

        let secrets = [
            ("sonar", &config.credentials.sonar_secret),
            ("jenkins", &config.credentials.jenkins_secret),
            ("gitlab", &config.credentials.gitlab_secret),
        ];
        if let Some((kind, _)) = secrets.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ConfigError::EmptySecretName(*kind));
        }

        Ok(())
    }
}
