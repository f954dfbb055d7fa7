// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sampling configuration and the read-snapshot seam used at request time.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;

pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Invalid sampling parameter: {0}")]
    InvalidParameter(String),
}

/// Generation-control parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Selected model. Never defaulted: a missing model fails the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model_id: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SamplingConfig {
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Model id if one is selected and non-blank.
    pub fn model(&self) -> Option<&str> {
        self.model_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_temperature(self.temperature)?;
        check_max_tokens(self.max_tokens)?;
        check_top_p(self.top_p)?;
        check_top_k(self.top_k)?;
        Ok(())
    }
}

fn check_temperature(value: f32) -> Result<(), SettingsError> {
    if !(0.0..=MAX_TEMPERATURE).contains(&value) {
        return Err(SettingsError::InvalidParameter(format!(
            "temperature must be in [0, {}], got {}",
            MAX_TEMPERATURE, value
        )));
    }
    Ok(())
}

fn check_max_tokens(value: u32) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::InvalidParameter("max_tokens must be > 0".into()));
    }
    Ok(())
}

fn check_top_p(value: f32) -> Result<(), SettingsError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SettingsError::InvalidParameter(format!(
            "top_p must be in [0, 1], got {}",
            value
        )));
    }
    Ok(())
}

fn check_top_k(value: u32) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::InvalidParameter("top_k must be > 0".into()));
    }
    Ok(())
}

/// Read access to the current sampling settings.
pub trait SamplingSource: Send + Sync {
    fn snapshot(&self) -> SamplingConfig;
}

/// In-memory sampling settings with validating setters.
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: RwLock<SamplingConfig>,
}

impl MemorySettings {
    pub fn new(config: SamplingConfig) -> Self {
        Self { inner: RwLock::new(config) }
    }

    pub fn set_model(&self, model_id: Option<String>) {
        self.inner.write().model_id = model_id;
    }

    pub fn set_temperature(&self, value: f32) -> Result<(), SettingsError> {
        check_temperature(value)?;
        self.inner.write().temperature = value;
        Ok(())
    }

    pub fn set_max_tokens(&self, value: u32) -> Result<(), SettingsError> {
        check_max_tokens(value)?;
        self.inner.write().max_tokens = value;
        Ok(())
    }

    pub fn set_top_p(&self, value: f32) -> Result<(), SettingsError> {
        check_top_p(value)?;
        self.inner.write().top_p = value;
        Ok(())
    }

    pub fn set_top_k(&self, value: u32) -> Result<(), SettingsError> {
        check_top_k(value)?;
        self.inner.write().top_k = value;
        Ok(())
    }
}

impl SamplingSource for MemorySettings {
    fn snapshot(&self) -> SamplingConfig {
        self.inner.read().clone()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
