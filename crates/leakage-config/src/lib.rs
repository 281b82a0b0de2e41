//! Runtime settings for the leakage prediction API.
//!
//! Values come from the process environment (after `.env` has been loaded by
//! the binary). Every setting has a default so the server starts with no
//! configuration at all.

use std::env;

use leakage_core::ModelType;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys & Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const HOST_KEY: &str = "HOST";
pub const PORT_KEY: &str = "PORT";
pub const CORS_ORIGINS_KEY: &str = "CORS_ORIGINS";
pub const MODEL_URI_KEY: &str = "MODEL_URI";
pub const MODEL_TYPE_KEY: &str = "MODEL_TYPE";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cors_origins: CorsOrigins,
    /// Registry location of the trained artifact. `None` serves the baseline model.
    pub model_uri: Option<String>,
    pub model_type: ModelType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: CorsOrigins::Any,
            model_uri: None,
            model_type: ModelType::default(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(host) = non_empty(lookup(HOST_KEY)) {
            settings.host = host;
        }

        if let Some(port) = non_empty(lookup(PORT_KEY)) {
            settings.port = port.parse().map_err(|e| ConfigError::Invalid {
                key: PORT_KEY,
                message: format!("{port:?}: {e}"),
            })?;
        }

        if let Some(origins) = non_empty(lookup(CORS_ORIGINS_KEY)) {
            settings.cors_origins = parse_origins(&origins);
        }

        settings.model_uri = non_empty(lookup(MODEL_URI_KEY));

        if let Some(model_type) = non_empty(lookup(MODEL_TYPE_KEY)) {
            settings.model_type = model_type
                .parse()
                .map_err(|message| ConfigError::Invalid { key: MODEL_TYPE_KEY, message })?;
        }

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Host and port for `TcpListener::bind`. `host` may be a name or an IP literal.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}
