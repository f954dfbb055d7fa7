// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Server-sent-event decoding.
//!
//! Bytes are split on `\n` before UTF-8 decoding, so a multi-byte character
//! split across network chunks is reassembled intact. Lines that do not
//! start with `data: ` are ignored. `data: [DONE]` ends the stream.

use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use thiserror::Error;

use crate::api::StreamEvent;
use crate::transport::{ByteStream, TransportError};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest line accepted. Longer lines are dropped whole.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Payload preview length used in diagnostics.
const PREVIEW_CHARS: usize = 120;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed stream event: {reason}")]
pub struct MalformedEvent {
    pub payload: String,
    pub reason: String,
}

/// Classification of a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    Skip,
    Done,
    Event(StreamEvent),
}

/// Classify one line (without its `\n`).
pub fn decode_line(line: &str) -> Result<SseLine, MalformedEvent> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(SseLine::Skip);
    };
    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Ok(SseLine::Done);
    }
    serde_json::from_str::<StreamEvent>(payload)
        .map(SseLine::Event)
        .map_err(|e| MalformedEvent { payload: preview(payload), reason: e.to_string() })
}

fn preview(payload: &str) -> String {
    payload.chars().take(PREVIEW_CHARS).collect()
}

enum LineStep {
    Continue,
    Done,
    Event(StreamEvent),
}

/// Pull-based decoder over a response body.
pub struct SseDecoder {
    source: ByteStream,
    partial: Vec<u8>,
    lines: VecDeque<Vec<u8>>,
    /// Inside an oversized line; bytes are dropped until the next `\n`.
    discarding: bool,
    source_closed: bool,
    done: bool,
    malformed: usize,
}

impl SseDecoder {
    pub fn new(source: ByteStream) -> Self {
        Self {
            source,
            partial: Vec::new(),
            lines: VecDeque::new(),
            discarding: false,
            source_closed: false,
            done: false,
            malformed: 0,
        }
    }

    /// Lines skipped because they failed to decode.
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    /// Next event, `None` at `[DONE]` or end of body, or the transport error
    /// that ended the body. Nothing is yielded after `None` or an error.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, TransportError>> {
        if self.done {
            return None;
        }
        loop {
            while let Some(line) = self.lines.pop_front() {
                match self.interpret(&line) {
                    LineStep::Continue => {}
                    LineStep::Event(event) => return Some(Ok(event)),
                    LineStep::Done => {
                        tracing::debug!("Stream end sentinel received");
                        self.terminate();
                        return None;
                    }
                }
            }

            if self.source_closed {
                if !self.partial.is_empty() && !self.discarding {
                    let trailing = std::mem::take(&mut self.partial);
                    self.lines.push_back(trailing);
                    continue;
                }
                self.terminate();
                return None;
            }

            match self.source.next().await {
                Some(Ok(chunk)) => self.push_bytes(&chunk),
                Some(Err(e)) => {
                    self.terminate();
                    return Some(Err(e));
                }
                None => self.source_closed = true,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<StreamEvent, TransportError>> + Send {
        futures::stream::unfold(self, |mut decoder| async move {
            decoder.next_event().await.map(|item| (item, decoder))
        })
    }

    fn push_bytes(&mut self, chunk: &[u8]) {
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            if self.discarding {
                self.discarding = false;
            } else if self.partial.len() + head.len() > MAX_LINE_BYTES {
                tracing::warn!(bytes = self.partial.len() + head.len(), "Dropping oversized stream line");
                self.partial.clear();
            } else {
                self.partial.extend_from_slice(head);
                self.lines.push_back(std::mem::take(&mut self.partial));
            }
            rest = &tail[1..];
        }

        if self.discarding {
            return;
        }
        if self.partial.len() + rest.len() > MAX_LINE_BYTES {
            tracing::warn!(bytes = self.partial.len() + rest.len(), "Dropping oversized stream line");
            self.partial.clear();
            self.discarding = true;
        } else {
            self.partial.extend_from_slice(rest);
        }
    }

    fn interpret(&mut self, line: &[u8]) -> LineStep {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                self.malformed += 1;
                tracing::warn!(error = %e, "Skipping stream line with invalid UTF-8");
                return LineStep::Continue;
            }
        };
        match decode_line(text) {
            Ok(SseLine::Skip) => LineStep::Continue,
            Ok(SseLine::Done) => LineStep::Done,
            Ok(SseLine::Event(event)) => LineStep::Event(event),
            Err(e) => {
                self.malformed += 1;
                tracing::warn!(reason = %e.reason, payload = %e.payload, "Skipping malformed stream event");
                LineStep::Continue
            }
        }
    }

    /// Stop reading and release the connection.
    fn terminate(&mut self) {
        self.done = true;
        self.lines.clear();
        self.partial.clear();
        self.source = Box::pin(futures::stream::empty());
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
