// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session state shared between the controller and its pipeline task.
//!
//! Every write is tagged with a session id; writes from a superseded
//! session are ignored.

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use super::types::{GenerationOutcome, SessionSnapshot, SessionStatus};

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub session_id: Option<Uuid>,
    pub status: SessionStatus,
    pub prompt: String,
    pub output: String,
    pub output_chars: usize,
    pub estimated_tokens: usize,
    pub started_at: Option<chrono::DateTime<Utc>>,
    pub last_outcome: Option<GenerationOutcome>,
    /// Set once any session has been launched.
    pub has_generated: bool,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            status: self.status,
            estimated_tokens: self.estimated_tokens,
            output_chars: self.output_chars,
            started_at: self.started_at,
            last_outcome: self.last_outcome.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SharedSession {
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SharedSession {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::default());
        Self { state: Mutex::new(SessionState::default()), snapshots }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Run `read` against the current state without publishing.
    pub fn read<T>(&self, read: impl FnOnce(&SessionState) -> T) -> T {
        read(&self.state.lock())
    }

    fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.lock();
        apply(&mut state);
        self.snapshots.send_replace(state.snapshot());
    }

    fn update_session(&self, id: Uuid, apply: impl FnOnce(&mut SessionState)) {
        self.update(|state| {
            if state.session_id == Some(id) {
                apply(state);
            }
        });
    }

    pub fn begin(&self, id: Uuid, prompt: &str) {
        self.update(|state| {
            state.session_id = Some(id);
            state.status = SessionStatus::Connecting;
            state.prompt = prompt.to_string();
            state.output.clear();
            state.output_chars = 0;
            state.estimated_tokens = 0;
            state.started_at = Some(Utc::now());
            state.last_outcome = None;
            state.has_generated = true;
        });
    }

    /// Record a failure that happened before any session was launched.
    pub fn reject(&self, outcome: GenerationOutcome) {
        self.update(|state| {
            state.status = outcome.settled_status();
            state.last_outcome = Some(outcome);
        });
    }

    pub fn mark_streaming(&self, id: Uuid) {
        self.update_session(id, |state| {
            if state.status == SessionStatus::Connecting {
                state.status = SessionStatus::Streaming;
            }
        });
    }

    /// Generation progress as seen by the pipeline.
    pub fn record_progress(&self, id: Uuid, estimated_tokens: usize) {
        self.update_session(id, |state| {
            state.estimated_tokens = state.estimated_tokens.max(estimated_tokens);
        });
    }

    /// Output the consumer has actually received; `regenerate` strips this.
    pub fn record_delivered(&self, id: Uuid, chunk: &str) {
        self.update_session(id, |state| {
            state.output.push_str(chunk);
            state.output_chars += chunk.chars().count();
        });
    }

    /// Settle an active session. No-op once the session already settled.
    pub fn settle(&self, id: Uuid, outcome: GenerationOutcome) {
        self.update_session(id, |state| {
            if state.status.is_active() {
                state.status = outcome.settled_status();
                state.last_outcome = Some(outcome);
            }
        });
    }
}
