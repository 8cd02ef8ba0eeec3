//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles `.env` credentials,
//! YAML file discovery, environment overrides and validation.

use super::error::{ConfigResult, ConfigurationError};
use super::BotConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ENV_PREFIX: &str = "SIGNBOT";
const BASE_FILE_STEM: &str = "signbot";
const SENSITIVE_KEYS: &[&str] = &["password"];

pub struct ConfigManager {
    config: BotConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_for_env(config_dir, &environment)
    }

    /// Read `.env` credentials, then load with an explicit environment
    pub fn load_from_directory_for_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_env_file();
        Self::load_from_directory_with_env(config_dir, environment)
    }

    /// Merge `.env` from the working directory into the process environment.
    /// A missing file is normal; a malformed one is reported.
    pub fn load_env_file() -> Option<PathBuf> {
        match dotenvy::dotenv() {
            Ok(path) => {
                debug!("Loaded credentials from {}", path.display());
                Some(path)
            }
            Err(e) if e.not_found() => {
                debug!("No .env file found");
                None
            }
            Err(e) => {
                warn!("Failed to read .env file: {e}");
                None
            }
        }
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Skips `.env` discovery so tests stay isolated from the working directory.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        let manager = ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        };

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&manager.sanitized())
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );
        info!(
            environment = %manager.environment,
            maxycon_url = %manager.config.maxycon.url,
            sign_url = %manager.config.sign.url,
            schedule = ?manager.config.schedule.daily_times,
            "Configuration loaded"
        );

        Ok(Arc::new(manager))
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Configuration as JSON with every credential masked
    pub fn sanitized(&self) -> serde_json::Value {
        sanitize_config_for_logging(&self.config)
    }

    /// Current environment from `SIGNBOT_ENV`, then `APP_ENV`
    pub fn detect_environment() -> String {
        env::var("SIGNBOT_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn load_and_merge_config(config_directory: &Path, environment: &str) -> ConfigResult<BotConfig> {
        if config_directory.exists() && !config_directory.is_dir() {
            return Err(ConfigurationError::DirectoryError {
                path: config_directory.to_path_buf(),
                error: "not a directory".to_string(),
            });
        }

        let base_file = config_directory.join(format!("{BASE_FILE_STEM}.yaml"));
        let env_file = config_directory.join(format!("{BASE_FILE_STEM}.{environment}.yaml"));

        let defaults = Config::try_from(&BotConfig::default()).map_err(|e| {
            ConfigurationError::LoadError {
                source_description: "built-in defaults".to_string(),
                error: e.to_string(),
            }
        })?;

        let merged = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(base_file.as_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                File::from(env_file.as_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("smtp.report_recipients")
                    .with_list_parse_key("schedule.daily_times")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::LoadError {
                source_description: config_directory.display().to_string(),
                error: e.to_string(),
            })?;

        Ok(merged.try_deserialize::<BotConfig>()?)
    }
}

fn sanitize_config_for_logging(config: &BotConfig) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or(serde_json::Value::Null);
    mask_sensitive(&mut value);
    value
}

fn mask_sensitive(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    if entry.as_str().is_some_and(|s| !s.is_empty()) {
                        *entry = serde_json::Value::String("***".to_string());
                    }
                } else {
                    mask_sensitive(entry);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(mask_sensitive),
        _ => {}
    }
}
