// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! reqwest-backed transport.
//!
//! Only the connect phase is bounded. Streamed bodies may stay open for as
//! long as the provider keeps generating; cancellation is the caller's job
//! and happens by dropping the body stream. No retries.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, Response};

use super::headers::{bearer_value, request_headers, ClientIdentity};
use super::{ByteStream, CompletionTransport, TransportError};
use crate::api::{CompletionRequest, ModelDescriptor, ModelsResponse};
use crate::config::ApiConfig;
use crate::credentials::ApiKey;

const COMPLETIONS_PATH: &str = "chat/completions";
const AUTH_KEY_PATH: &str = "auth/key";
const MODELS_PATH: &str = "models";

/// Error bodies are truncated to this many bytes before being surfaced.
const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

pub struct HttpTransport {
    client: Client,
    base_url: String,
    identity: ClientIdentity,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            identity: ClientIdentity::from_config(config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn open_stream(
        &self,
        request: &CompletionRequest,
        api_key: &ApiKey,
    ) -> Result<ByteStream, TransportError> {
        let headers = request_headers(&self.identity, Some(api_key), true, HeaderMap::new())?;

        tracing::debug!(
            model = request.model(),
            key = %api_key.fingerprint(),
            messages = request.messages().len(),
            "Opening completion stream"
        );

        let response = self
            .client
            .post(self.endpoint(COMPLETIONS_PATH))
            .headers(headers)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        tracing::debug!(status = response.status().as_u16(), "Completion stream opened");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from));
        Ok(Box::pin(body))
    }

    async fn validate_key(&self, candidate: &ApiKey) -> bool {
        let headers = match bearer_value(candidate).and_then(|value| {
            let mut caller = HeaderMap::new();
            caller.insert(AUTHORIZATION, value);
            request_headers(&self.identity, None, false, caller)
        }) {
            Ok(headers) => headers,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot build key validation request");
                return false;
            }
        };

        match self.client.get(self.endpoint(AUTH_KEY_PATH)).headers(headers).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(status = status.as_u16(), key = %candidate.fingerprint(), "Key validation response");
                status.is_success()
            }
            Err(e) => {
                tracing::warn!(error = %TransportError::from(e), "Key validation request failed");
                false
            }
        }
    }

    async fn list_models(&self, api_key: &ApiKey) -> Result<Vec<ModelDescriptor>, TransportError> {
        let headers = request_headers(&self.identity, Some(api_key), false, HeaderMap::new())?;
        let response = self
            .client
            .get(self.endpoint(MODELS_PATH))
            .headers(headers)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: ModelsResponse = response.json().await?;
        Ok(body.into_descriptors())
    }
}

/// Pass 2xx responses through; turn anything else into `Http` with its body.
async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut cut = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    tracing::warn!(status = status.as_u16(), "Provider returned error status");
    Err(TransportError::Http { status: status.as_u16(), body })
}
