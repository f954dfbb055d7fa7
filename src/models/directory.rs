// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Model directory: the provider's model list, ranked, with fallbacks.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::{ModelDescriptor, Pricing};
use crate::credentials::ApiKey;
use crate::settings::{MemorySettings, SamplingSource};
use crate::transport::CompletionTransport;

pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3.1-70b-instruct:free";
pub const DEFAULT_MODEL_NAME: &str = "Llama 3.1 70B Instruct";
pub const DEFAULT_MODEL_CONTEXT: u64 = 4096;

/// Families listed first, in this order.
pub const PREFERRED_FAMILIES: [&str; 4] = ["claude-3", "claude", "gpt-4", "mistral"];

/// Returned when a fetch fails and nothing is cached.
pub const FALLBACK_MODEL_IDS: [&str; 4] = [
    "anthropic/claude-3-opus-20240229",
    "anthropic/claude-3-sonnet-20240229",
    "anthropic/claude-2.1",
    "mistral/mistral-large-latest",
];

/// Free model used when no key is stored or the provider lists nothing.
pub fn default_model() -> ModelDescriptor {
    ModelDescriptor {
        id: DEFAULT_MODEL_ID.into(),
        name: Some(DEFAULT_MODEL_NAME.into()),
        description: Some("Free Llama 3.1 70B model with good performance".into()),
        pricing: Some(Pricing { prompt: Some(0.0), completion: Some(0.0) }),
        context_length: Some(DEFAULT_MODEL_CONTEXT),
    }
}

pub fn fallback_models() -> Vec<ModelDescriptor> {
    FALLBACK_MODEL_IDS.iter().map(|id| ModelDescriptor::new(*id)).collect()
}

/// Sort key: one flag per preferred family, `false` when the id contains it.
fn preference_key(id: &str) -> [bool; 4] {
    PREFERRED_FAMILIES.map(|family| !id.contains(family))
}

/// Stable sort by family preference; unmatched models keep provider order.
pub fn rank_models(models: &mut [ModelDescriptor]) {
    models.sort_by_key(|m| preference_key(&m.id));
}

pub struct ModelDirectory {
    transport: Arc<dyn CompletionTransport>,
    /// Last successful list. The lock also serializes fetches.
    cache: Mutex<Option<Vec<ModelDescriptor>>>,
}

impl ModelDirectory {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self { transport, cache: Mutex::new(None) }
    }

    /// Fetch and rank the model list. Never fails.
    ///
    /// - no key: the default model, without a network call
    /// - empty list: the default model
    /// - failure: the last good list, else the built-in fallbacks
    pub async fn fetch(&self, api_key: Option<&ApiKey>) -> Vec<ModelDescriptor> {
        let Some(api_key) = api_key else {
            tracing::debug!("No API key stored, offering default model only");
            return vec![default_model()];
        };

        let mut cache = self.cache.lock().await;
        match self.transport.list_models(api_key).await {
            Ok(models) if models.is_empty() => {
                tracing::warn!("Provider returned an empty model list");
                vec![default_model()]
            }
            Ok(mut models) => {
                rank_models(&mut models);
                tracing::info!(count = models.len(), "Fetched model list");
                *cache = Some(models.clone());
                models
            }
            Err(e) => {
                let cached = cache.clone();
                tracing::warn!(error = %e, cached = cached.is_some(), "Model list fetch failed");
                cached.unwrap_or_else(fallback_models)
            }
        }
    }

    pub async fn cached(&self) -> Option<Vec<ModelDescriptor>> {
        self.cache.lock().await.clone()
    }
}

/// Select the first model if none is selected yet. Returns the selection.
pub fn ensure_default_model(settings: &MemorySettings, models: &[ModelDescriptor]) -> Option<String> {
    if let Some(current) = settings.snapshot().model() {
        return Some(current.to_string());
    }
    let first = models.first()?.id.clone();
    tracing::info!(model = %first, "Selecting default model");
    settings.set_model(Some(first.clone()));
    Some(first)
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
