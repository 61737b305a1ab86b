use std::path::PathBuf;
use thiserror::Error;

use crate::collector::PollError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum FailboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Poll error: {0}")]
    Poll(#[from] PollError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Failed to start poller: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Failed to resolve collector API key: {0}")]
    Secret(#[from] SecretError),

    #[error("No config path given and no default config directory available")]
    NoDefaultPath,
}

pub type Result<T> = std::result::Result<T, FailboardError>;
