// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Single-flight generation controller.
//!
//! At most one session is active. Starting a new one stops the previous
//! one first, and `stop` does not return until the pipeline task has
//! exited, so no chunk of a stopped session reaches its consumer.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::handle::GenerationStream;
use super::pipeline::Pipeline;
use super::state::SharedSession;
use super::types::{GenerationError, GenerationOutcome, SessionSnapshot};
use crate::api::{build_request, CompletionRequest};
use crate::context::ClientContext;
use crate::credentials::ApiKey;
use crate::stream::DeltaAccumulator;

struct ActiveSession {
    id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct GenerationController {
    context: Arc<ClientContext>,
    shared: Arc<SharedSession>,
    active: Mutex<Option<ActiveSession>>,
}

impl GenerationController {
    pub fn new(context: Arc<ClientContext>) -> Self {
        Self {
            context,
            shared: Arc::new(SharedSession::new()),
            active: Mutex::new(None),
        }
    }

    pub fn context(&self) -> &Arc<ClientContext> {
        &self.context
    }

    /// Start generating a continuation of `prompt`.
    ///
    /// Configuration problems (no key, no model) are returned here and no
    /// request is sent. Network and provider failures arrive on the stream
    /// as `Finished(Failed)`.
    pub async fn start(&self, prompt: &str) -> Result<GenerationStream, GenerationError> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            tracing::info!(session = %previous.id, "Superseding active generation");
            self.shutdown(previous).await;
        }
        self.launch(prompt, &mut active)
    }

    /// Stop the active session and wait for its task to exit.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(session) = active.take() {
            self.shutdown(session).await;
        }
    }

    /// Stop if a session is active, otherwise start one.
    pub async fn toggle(&self, prompt: &str) -> Result<Option<GenerationStream>, GenerationError> {
        if self.is_active() {
            self.stop().await;
            Ok(None)
        } else {
            self.start(prompt).await.map(Some)
        }
    }

    /// Generate again from the text the last session started from.
    ///
    /// `current_text` must still end with that session's output; the output
    /// is removed and the remainder is used as the new prompt.
    pub async fn regenerate(&self, current_text: &str) -> Result<GenerationStream, GenerationError> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            self.shutdown(previous).await;
        }

        let base = self.shared.read(|state| {
            if !state.has_generated {
                return Err(GenerationError::NoPreviousGeneration);
            }
            current_text
                .strip_suffix(state.output.as_str())
                .map(str::to_string)
                .ok_or(GenerationError::RegenerateMismatch)
        });
        let base = match base {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot regenerate");
                return Err(e);
            }
        };

        tracing::info!(prompt_chars = base.chars().count(), "Regenerating");
        self.launch(&base, &mut active)
    }

    pub fn is_active(&self) -> bool {
        self.shared.snapshot().status.is_active()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshot()
    }

    /// Watch status and token-estimate changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.subscribe()
    }

    /// Text delivered by the most recent session.
    pub fn last_output(&self) -> String {
        self.shared.read(|state| state.output.clone())
    }

    /// Prompt the most recent session started from.
    pub fn last_prompt(&self) -> String {
        self.shared.read(|state| state.prompt.clone())
    }

    fn prepare(&self, prompt: &str) -> Result<(CompletionRequest, ApiKey), GenerationError> {
        let api_key = self
            .context
            .credentials
            .get()
            .ok_or_else(|| GenerationError::configuration("no API key stored"))?;
        let sampling = self.context.settings.snapshot();
        let request = build_request(prompt, &sampling, &self.context.config.generation.build_options())?;
        Ok((request, api_key))
    }

    fn launch(
        &self,
        prompt: &str,
        slot: &mut Option<ActiveSession>,
    ) -> Result<GenerationStream, GenerationError> {
        let (request, api_key) = match self.prepare(prompt) {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::warn!(error = %error, "Generation not started");
                self.shared.reject(GenerationOutcome::Failed { error: error.clone() });
                return Err(error);
            }
        };

        let generation = &self.context.config.generation;
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (updates, receiver) = mpsc::channel(self.context.config.api.channel_capacity.max(1));

        self.shared.begin(id, prompt);

        let pipeline = Pipeline {
            id,
            request,
            api_key,
            transport: Arc::clone(&self.context.transport),
            accumulator: DeltaAccumulator::new(prompt, generation.echo_mode())
                .with_chars_per_token(generation.chars_per_token),
            emit_interval: generation.emit_interval(),
            shared: Arc::clone(&self.shared),
            cancel: cancel.clone(),
            updates,
        };
        let task = tokio::spawn(pipeline.run());

        *slot = Some(ActiveSession { id, cancel: cancel.clone(), task });
        Ok(GenerationStream::new(id, receiver, cancel, Arc::clone(&self.shared)))
    }

    async fn shutdown(&self, session: ActiveSession) {
        if session.task.is_finished() {
            return;
        }
        tracing::info!(session = %session.id, "Stopping generation");
        session.cancel.cancel();
        if let Err(e) = session.task.await {
            if e.is_panic() {
                tracing::error!(session = %session.id, "Generation task panicked");
            }
        }
        self.shared.settle(session.id, GenerationOutcome::Stopped);
    }
}

impl Drop for GenerationController {
    fn drop(&mut self) {
        if let Some(session) = self.active.get_mut().take() {
            session.cancel.cancel();
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
