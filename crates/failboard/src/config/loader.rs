use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::config::schema::DashboardConfig;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Default config location: `<config dir>/failboard/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("failboard").join("config.json"))
}

/// Loads a config file; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DashboardConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        load_config_from_yaml_str(&content)
    } else {
        load_config_from_str(&content)
    }
}

pub fn load_config_from_str(content: &str) -> Result<DashboardConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;
    load_config_from_value(json_value)
}

pub fn load_config_from_yaml_str(content: &str) -> Result<DashboardConfig, ConfigError> {
    let json_value: serde_json::Value = serde_yaml::from_str(content)?;
    load_config_from_value(json_value)
}

fn load_config_from_value(json_value: serde_json::Value) -> Result<DashboardConfig, ConfigError> {
    validate_schema(&json_value)?;

    let config: DashboardConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Resolves the collector API key named by the config.
pub fn resolve_api_key(config: &DashboardConfig) -> Result<SecretString, ConfigError> {
    Ok(config.collector.api_key.resolve()?)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

fn validate_config(config: &DashboardConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let endpoint = config.collector.endpoint.trim();
    if endpoint.is_empty() {
        return Err(invalid("Collector endpoint is required"));
    }
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(invalid(format!(
            "Collector endpoint must be an http(s) URL: {}",
            crate::sanitize::redact_url(endpoint)
        )));
    }

    if !config.collector.api_key.is_configured() {
        return Err(invalid(
            "Collector API key is required (apiKey, apiKeyFile or apiKeyEnv)",
        ));
    }

    if config.operator.trim().is_empty() {
        return Err(invalid("Operator identity is required"));
    }

    if config.poll_interval_secs == 0 {
        return Err(invalid("pollIntervalSecs must be greater than zero"));
    }

    let retry = &config.collector.retry;
    if retry.initial_backoff_ms > retry.max_backoff_ms {
        return Err(invalid(format!(
            "retry.initialBackoffMs ({}) exceeds retry.maxBackoffMs ({})",
            retry.initial_backoff_ms, retry.max_backoff_ms
        )));
    }

    if config.notification_capacity == 0 {
        return Err(invalid("notificationCapacity must be greater than zero"));
    }

    Ok(())
}
