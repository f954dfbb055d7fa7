// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Turning a response body into text deltas.
//!
//! - `decoder`: byte chunks to `StreamEvent`s (SSE `data:` framing)
//! - `accumulator`: events to caller-visible chunks, with optional prompt-echo suppression

mod accumulator;
mod decoder;

pub use accumulator::{AccumulatorStep, DeltaAccumulator, EchoMode, DEFAULT_CHARS_PER_TOKEN};
pub use decoder::{
    decode_line, MalformedEvent, SseDecoder, SseLine, DATA_PREFIX, DONE_SENTINEL, MAX_LINE_BYTES,
};
