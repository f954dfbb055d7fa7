// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Notebook core: a streaming completion client for hosted LLM chat APIs.
//!
//! The crate turns a document's text into a chat-completion request, streams
//! the server-sent-event response, and hands text deltas back to the caller
//! as they arrive. Pipeline, leaf-first:
//!
//! - [`api`]: wire types and the pure request builder
//! - [`transport`]: authenticated HTTP with streaming bodies
//! - [`stream`]: SSE line decoding and delta accumulation
//! - [`session`]: the single-flight generation controller
//! - [`models`]: ranked model list with cache fallback

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod credentials;
pub mod logging;
pub mod models;
pub mod session;
pub mod settings;
pub mod stream;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{
    build_request, BuildError, BuildOptions, ChatMessage, CompletionRequest, ModelDescriptor,
    StreamEvent, Usage,
};
pub use config::{ClientConfig, ConfigError};
pub use context::ClientContext;
pub use credentials::{validate_and_store, ApiKey, CredentialStore, MemoryCredentialStore};
pub use models::ModelDirectory;
pub use session::{
    GenerationController, GenerationError, GenerationOutcome, GenerationStream, GenerationUpdate,
    SessionSnapshot, SessionStatus,
};
pub use settings::{MemorySettings, SamplingConfig, SamplingSource, SettingsError};
pub use stream::{DeltaAccumulator, EchoMode, SseDecoder};
pub use transport::{ByteStream, CompletionTransport, HttpTransport, TransportError};
