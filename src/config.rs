// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client configuration: TOML file plus `NOTEBOOK_*` environment overrides.
//!
//! Precedence, lowest first: built-in defaults, the file named by
//! `NOTEBOOK_CONFIG`, then individual environment variables.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{BuildOptions, DEFAULT_SYSTEM_PREAMBLE};
use crate::credentials::ApiKey;
use crate::logging::{LogFormat, LoggingConfig};
use crate::settings::SamplingConfig;
use crate::stream::{EchoMode, DEFAULT_CHARS_PER_TOKEN};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "https://github.com/notebook-core/notebook";
pub const DEFAULT_TITLE: &str = "Notebook";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub const ENV_CONFIG_PATH: &str = "NOTEBOOK_CONFIG";
pub const ENV_BASE_URL: &str = "NOTEBOOK_BASE_URL";
pub const ENV_API_KEY: &str = "NOTEBOOK_API_KEY";
pub const ENV_MODEL: &str = "NOTEBOOK_MODEL";
pub const ENV_LOG_LEVEL: &str = "NOTEBOOK_LOG";
pub const ENV_LOG_FORMAT: &str = "NOTEBOOK_LOG_FORMAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Endpoint and connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as `HTTP-Referer` for provider attribution.
    pub referer: String,
    /// Sent as `X-Title`.
    pub title: String,
    pub connect_timeout_secs: u64,
    /// Bound on undelivered chunks between the pipeline and its consumer.
    pub channel_capacity: usize,
    /// Honor `HTTP(S)_PROXY` from the environment.
    pub use_system_proxy: bool,
    /// Seed for the credential store. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            referer: DEFAULT_REFERER.into(),
            title: DEFAULT_TITLE.into(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            use_system_proxy: true,
            api_key: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key shown only as its fingerprint.
        let api_key = self.api_key.as_deref().and_then(ApiKey::new);
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("channel_capacity", &self.channel_capacity)
            .field("use_system_proxy", &self.use_system_proxy)
            .field("api_key", &api_key)
            .finish()
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Prompt shaping and delivery behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub include_system_preamble: bool,
    pub system_preamble: String,
    pub echo_suppression: bool,
    /// Minimum spacing between delivered chunks; 0 disables pacing.
    pub emit_interval_ms: u64,
    pub chars_per_token: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            include_system_preamble: false,
            system_preamble: DEFAULT_SYSTEM_PREAMBLE.into(),
            echo_suppression: false,
            emit_interval_ms: 0,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl GenerationConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            include_system_preamble: self.include_system_preamble,
            system_preamble: self.system_preamble.clone(),
        }
    }

    pub fn echo_mode(&self) -> EchoMode {
        if self.echo_suppression {
            EchoMode::SuppressPrompt
        } else {
            EchoMode::Off
        }
    }

    pub fn emit_interval(&self) -> Duration {
        Duration::from_millis(self.emit_interval_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub generation: GenerationConfig,
    pub sampling: SamplingConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Render as TOML. The API key is never included.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `NOTEBOOK_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.sampling.model_id = Some(model);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            match format.parse::<LogFormat>() {
                Ok(format) => self.logging.format = format,
                Err(e) => tracing::warn!(error = %e, "ignoring {}", ENV_LOG_FORMAT),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.connect_timeout_secs must be > 0".into()));
        }
        if self.api.channel_capacity == 0 {
            return Err(ConfigError::Invalid("api.channel_capacity must be > 0".into()));
        }
        if self.generation.chars_per_token == 0 {
            return Err(ConfigError::Invalid("generation.chars_per_token must be > 0".into()));
        }
        if self.generation.include_system_preamble
            && self.generation.system_preamble.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "generation.system_preamble is empty but include_system_preamble is set".into(),
            ));
        }
        self.sampling
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

/// Load from `NOTEBOOK_CONFIG` (if set), apply env overrides, validate.
pub fn load() -> Result<ClientConfig, ConfigError> {
    let mut config = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => ClientConfig::from_file(Path::new(&path))?,
        _ => ClientConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
