// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! The per-session task: connect, decode, accumulate, deliver.
//!
//! Every await point races the session's cancellation token, so a stop
//! takes effect at the next suspension and drops the response body.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::SharedSession;
use super::types::{GenerationError, GenerationOutcome, GenerationUpdate};
use crate::api::CompletionRequest;
use crate::credentials::ApiKey;
use crate::stream::{DeltaAccumulator, SseDecoder};
use crate::transport::CompletionTransport;

pub(crate) struct Pipeline {
    pub id: Uuid,
    pub request: CompletionRequest,
    pub api_key: ApiKey,
    pub transport: Arc<dyn CompletionTransport>,
    pub accumulator: DeltaAccumulator,
    pub emit_interval: Duration,
    pub shared: Arc<SharedSession>,
    pub cancel: CancellationToken,
    pub updates: mpsc::Sender<GenerationUpdate>,
}

impl Pipeline {
    pub async fn run(mut self) {
        let outcome = match self.drive().await {
            Ok(finish_reason) => GenerationOutcome::Completed {
                finish_reason,
                usage: self.accumulator.usage().cloned(),
            },
            Err(GenerationError::Cancelled) => {
                tracing::debug!(session = %self.id, "Generation pipeline cancelled");
                self.shared.settle(self.id, GenerationOutcome::Stopped);
                return;
            }
            Err(error) => {
                tracing::error!(session = %self.id, error = %error, "Generation failed");
                GenerationOutcome::Failed { error }
            }
        };

        tracing::info!(
            session = %self.id,
            chars = self.accumulator.emitted_chars(),
            estimated_tokens = self.accumulator.estimated_tokens(),
            completed = outcome.is_completed(),
            "Generation finished"
        );
        self.shared.settle(self.id, outcome.clone());
        // The consumer may already be gone.
        let _ = self.deliver(GenerationUpdate::Finished(outcome)).await;
    }

    /// Returns the finish reason, if the provider sent one.
    async fn drive(&mut self) -> Result<Option<String>, GenerationError> {
        tracing::info!(
            session = %self.id,
            model = self.request.model(),
            key = %self.api_key.fingerprint(),
            "Starting generation"
        );

        let body = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(GenerationError::Cancelled),
            opened = self.transport.open_stream(&self.request, &self.api_key) => opened?,
        };
        self.shared.mark_streaming(self.id);

        let mut decoder = SseDecoder::new(body);
        let mut last_emit: Option<Instant> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(GenerationError::Cancelled),
                next = decoder.next_event() => next,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    self.accumulator.finish(None);
                    return Ok(None);
                }
            };

            if let Some(error) = &event.error {
                return Err(GenerationError::Upstream { message: error.message.clone() });
            }

            let step = self.accumulator.accept(&event);
            if let Some(chunk) = step.chunk {
                self.pace(&mut last_emit).await?;
                self.shared.record_progress(self.id, self.accumulator.estimated_tokens());
                self.deliver(GenerationUpdate::Chunk(chunk)).await?;
            }
            if step.finish_reason.is_some() {
                tracing::debug!(session = %self.id, reason = ?step.finish_reason, "Provider finished");
                return Ok(step.finish_reason);
            }
        }
    }

    /// Hold back delivery until `emit_interval` has passed since the last one.
    async fn pace(&self, last_emit: &mut Option<Instant>) -> Result<(), GenerationError> {
        if self.emit_interval.is_zero() {
            return Ok(());
        }
        if let Some(previous) = *last_emit {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(GenerationError::Cancelled),
                _ = tokio::time::sleep_until(previous + self.emit_interval) => {}
            }
        }
        *last_emit = Some(Instant::now());
        Ok(())
    }

    async fn deliver(&self, update: GenerationUpdate) -> Result<(), GenerationError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GenerationError::Cancelled),
            sent = self.updates.send(update) => sent.map_err(|_| {
                tracing::debug!(session = %self.id, "Consumer dropped the generation stream");
                GenerationError::Cancelled
            }),
        }
    }
}
