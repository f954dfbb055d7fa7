// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process transport double for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;

use crate::api::{CompletionRequest, ModelDescriptor};
use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::credentials::{ApiKey, MemoryCredentialStore};
use crate::settings::{MemorySettings, SamplingConfig};
use crate::transport::{ByteStream, CompletionTransport, TransportError};

/// What the next `open_stream` call returns.
pub(crate) enum Script {
    /// Body made of these chunks, then end of stream.
    Body(Vec<String>),
    /// Body made of these chunks, then no further data ever.
    BodyThenHang(Vec<String>),
    /// Each chunk is delayed before it is yielded.
    Paced(Vec<String>, Duration),
    Fail(TransportError),
    /// `open_stream` itself never resolves.
    NeverConnect,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    model_lists: Mutex<VecDeque<Result<Vec<ModelDescriptor>, TransportError>>>,
    valid_keys: Vec<String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    pub model_calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: Script) -> Self {
        self.scripts.lock().push_back(script);
        self
    }

    pub fn with_models(self, models: Result<Vec<ModelDescriptor>, TransportError>) -> Self {
        self.model_lists.lock().push_back(models);
        self
    }

    pub fn with_valid_key(mut self, key: &str) -> Self {
        self.valid_keys.push(key.to_string());
        self
    }

    pub fn push_script(&self, script: Script) {
        self.scripts.lock().push_back(script);
    }

    pub fn recorded(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

fn body(chunks: Vec<String>) -> impl futures::Stream<Item = Result<Bytes, TransportError>> {
    futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn open_stream(
        &self,
        request: &CompletionRequest,
        _api_key: &ApiKey,
    ) -> Result<ByteStream, TransportError> {
        self.requests.lock().push(request.clone());
        let script = self.scripts.lock().pop_front();
        match script {
            Some(Script::Body(chunks)) => Ok(Box::pin(body(chunks))),
            Some(Script::BodyThenHang(chunks)) => {
                Ok(Box::pin(body(chunks).chain(futures::stream::pending())))
            }
            Some(Script::Paced(chunks, delay)) => Ok(Box::pin(body(chunks).then(move |chunk| async move {
                tokio::time::sleep(delay).await;
                chunk
            }))),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::NeverConnect) => futures::future::pending().await,
            None => Err(TransportError::network("no scripted response")),
        }
    }

    async fn validate_key(&self, candidate: &ApiKey) -> bool {
        self.valid_keys.iter().any(|k| k == candidate.expose())
    }

    async fn list_models(&self, _api_key: &ApiKey) -> Result<Vec<ModelDescriptor>, TransportError> {
        self.model_calls.fetch_add(1, Ordering::SeqCst);
        self.model_lists
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("no scripted model list")))
    }
}

/// SSE line carrying one content delta.
pub(crate) fn sse_delta(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]})
    )
}

pub(crate) fn sse_finish(reason: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"index": 0, "delta": {}, "finish_reason": reason}]})
    )
}

pub(crate) const SSE_DONE: &str = "data: [DONE]\n\n";

pub(crate) fn test_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.sampling = SamplingConfig::default().with_model("test/model");
    config
}

/// Context with a stored key and a selected model.
pub(crate) fn test_context(config: ClientConfig, transport: Arc<ScriptedTransport>) -> Arc<ClientContext> {
    let settings = MemorySettings::new(config.sampling.clone());
    let credentials = match ApiKey::new("sk-test") {
        Some(key) => MemoryCredentialStore::with_key(key),
        None => MemoryCredentialStore::new(),
    };
    Arc::new(ClientContext::new(config, Arc::new(credentials), Arc::new(settings), transport))
}
