// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared client dependencies, passed explicitly instead of held globally.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::credentials::{ApiKey, CredentialStore, MemoryCredentialStore};
use crate::settings::{MemorySettings, SamplingSource};
use crate::transport::{CompletionTransport, HttpTransport, TransportError};

pub struct ClientContext {
    pub config: ClientConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub settings: Arc<dyn SamplingSource>,
    pub transport: Arc<dyn CompletionTransport>,
}

impl ClientContext {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        settings: Arc<dyn SamplingSource>,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self { config, credentials, settings, transport }
    }

    /// Wire the default in-memory stores and the HTTP transport.
    ///
    /// The credential store is seeded from `api.api_key` and the settings
    /// from `[sampling]`.
    pub fn from_config(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(HttpTransport::new(&config.api)?);
        let credentials = match config.api.api_key.as_deref().and_then(ApiKey::new) {
            Some(key) => MemoryCredentialStore::with_key(key),
            None => MemoryCredentialStore::new(),
        };
        let settings = MemorySettings::new(config.sampling.clone());

        Ok(Self::new(config, Arc::new(credentials), Arc::new(settings), transport))
    }
}
