//! Collector API key resolution.
//!
//! The key can be given three ways, checked in this order:
//!
//! 1. **Inline** - `apiKey: "..."`, handy for local testing
//! 2. **File** - `apiKeyFile: /run/secrets/ctm_api_key` (Docker secrets)
//! 3. **Env var** - `apiKeyEnv: CTM_API_KEY` (Kubernetes, systemd)

use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No API key source provided (need one of: apiKey, apiKeyFile or apiKeyEnv)")]
    NoSourceProvided,

    #[error("Failed to read API key from file '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API key file '{path}' is empty")]
    EmptyFile { path: PathBuf },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Where to find the collector API key. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySource {
    #[serde(default, rename = "apiKey", skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    #[serde(default, rename = "apiKeyFile", skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl ApiKeySource {
    pub fn inline(key: &str) -> Self {
        Self {
            inline: Some(key.to_string()),
            ..Default::default()
        }
    }

    /// True if at least one source is configured.
    pub fn is_configured(&self) -> bool {
        non_empty(&self.inline).is_some()
            || non_empty(&self.file).is_some()
            || non_empty(&self.env).is_some()
    }

    /// Resolves the key from the first configured source.
    ///
    /// Whitespace around file and env values is trimmed.
    pub fn resolve(&self) -> Result<SecretString> {
        if let Some(value) = non_empty(&self.inline) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = non_empty(&self.file) {
            let expanded = expand_home(path);
            let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
                path: expanded.clone(),
                source: e,
            })?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                return Err(SecretError::EmptyFile { path: expanded });
            }
            return Ok(SecretString::from(trimmed.to_string()));
        }

        if let Some(name) = non_empty(&self.env) {
            return match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// `~user/path` is not supported.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return match path.strip_prefix("~/") {
                Some(rest) => home.join(rest),
                None => home,
            };
        }
    }
    PathBuf::from(path)
}
