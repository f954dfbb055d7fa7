// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Consumer side of a generation session.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::state::SharedSession;
use super::types::{GenerationOutcome, GenerationUpdate};

/// Receives the chunks of one session, then exactly one `Finished`.
///
/// Once the session is stopped, `recv` yields `Finished(Stopped)` even if
/// chunks were still buffered, and `None` afterwards. Only chunks returned
/// from `recv` count as the session's output.
#[derive(Debug)]
pub struct GenerationStream {
    session_id: Uuid,
    receiver: mpsc::Receiver<GenerationUpdate>,
    cancel: CancellationToken,
    shared: Arc<SharedSession>,
    finished: bool,
}

impl GenerationStream {
    pub(crate) fn new(
        session_id: Uuid,
        receiver: mpsc::Receiver<GenerationUpdate>,
        cancel: CancellationToken,
        shared: Arc<SharedSession>,
    ) -> Self {
        Self { session_id, receiver, cancel, shared, finished: false }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn recv(&mut self) -> Option<GenerationUpdate> {
        if self.finished {
            return None;
        }

        let update = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => GenerationUpdate::Finished(GenerationOutcome::Stopped),
            update = self.receiver.recv() => match update {
                Some(update) => update,
                // Pipeline exited without a final update; only happens on stop.
                None => GenerationUpdate::Finished(GenerationOutcome::Stopped),
            },
        };

        match &update {
            GenerationUpdate::Chunk(chunk) => self.shared.record_delivered(self.session_id, chunk),
            GenerationUpdate::Finished(_) => {
                self.finished = true;
                self.receiver.close();
            }
        }
        Some(update)
    }

    /// Drain the session, returning the delivered text and the outcome.
    pub async fn collect_text(mut self) -> (String, GenerationOutcome) {
        let mut text = String::new();
        while let Some(update) = self.recv().await {
            match update {
                GenerationUpdate::Chunk(chunk) => text.push_str(&chunk),
                GenerationUpdate::Finished(outcome) => return (text, outcome),
            }
        }
        (text, GenerationOutcome::Stopped)
    }

    pub fn into_stream(self) -> impl Stream<Item = GenerationUpdate> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            stream.recv().await.map(|update| (update, stream))
        })
    }
}
