// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Session status, outcomes and errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{BuildError, Usage};
use crate::settings::SettingsError;
use crate::transport::TransportError;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Network error: {cause}")]
    Network { cause: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Provider error: {message}")]
    Upstream { message: String },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("No previous generation to regenerate")]
    NoPreviousGeneration,

    #[error("Document no longer ends with the last generated text")]
    RegenerateMismatch,
}

impl GenerationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}

impl From<BuildError> for GenerationError {
    fn from(err: BuildError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<SettingsError> for GenerationError {
    fn from(err: SettingsError) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<TransportError> for GenerationError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network { cause } => Self::Network { cause },
            TransportError::Http { status, body } => Self::Http { status, body },
            TransportError::Decode(cause) => Self::Network { cause },
            TransportError::InvalidHeader(name) => {
                Self::configuration(format!("invalid value for header {}", name))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Stopped,
    Failed,
}

impl SessionStatus {
    /// Connecting or streaming.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Streaming => "streaming",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Completed {
        finish_reason: Option<String>,
        usage: Option<Usage>,
    },
    Stopped,
    Failed {
        error: GenerationError,
    },
}

impl GenerationOutcome {
    /// Status the session settles in after this outcome.
    pub fn settled_status(&self) -> SessionStatus {
        match self {
            Self::Completed { .. } => SessionStatus::Idle,
            Self::Stopped => SessionStatus::Stopped,
            Self::Failed { .. } => SessionStatus::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Item delivered to the consumer of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationUpdate {
    Chunk(String),
    /// Always the last item of a session.
    Finished(GenerationOutcome),
}

/// Observable state of the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub status: SessionStatus,
    pub estimated_tokens: usize,
    pub output_chars: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<GenerationOutcome>,
}
