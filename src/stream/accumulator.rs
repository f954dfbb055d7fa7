// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Delta accumulation and prompt-echo suppression.
//!
//! Some models restate the prompt before continuing it. With
//! [`EchoMode::SuppressPrompt`] the accumulator buffers leading output while
//! it is still a prefix of the prompt and drops the echoed part once the
//! buffer is long enough to decide.

use serde::{Deserialize, Serialize};

use crate::api::{StreamEvent, Usage};

pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoMode {
    /// Every delta is delivered as-is.
    #[default]
    Off,
    /// A leading restatement of the prompt is removed.
    SuppressPrompt,
}

/// Result of feeding one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatorStep {
    /// Text to deliver, if any.
    pub chunk: Option<String>,
    /// Set when the event carried a finish reason. Nothing is accepted after.
    pub finish_reason: Option<String>,
}

#[derive(Debug)]
pub struct DeltaAccumulator {
    prompt: String,
    echo: EchoMode,
    found_start: bool,
    echo_buffer: String,
    emitted_chars: usize,
    chars_per_token: usize,
    usage: Option<Usage>,
    finish_reason: Option<String>,
    closed: bool,
}

impl DeltaAccumulator {
    pub fn new(prompt: impl Into<String>, echo: EchoMode) -> Self {
        Self {
            prompt: prompt.into(),
            echo,
            found_start: echo == EchoMode::Off,
            echo_buffer: String::new(),
            emitted_chars: 0,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            usage: None,
            finish_reason: None,
            closed: false,
        }
    }

    pub fn with_chars_per_token(mut self, chars_per_token: usize) -> Self {
        self.chars_per_token = chars_per_token.max(1);
        self
    }

    pub fn accept(&mut self, event: &StreamEvent) -> AccumulatorStep {
        if self.closed {
            return AccumulatorStep::default();
        }
        if let Some(usage) = &event.usage {
            self.usage = Some(usage.clone());
        }

        let chunk = event.content().and_then(|content| self.route(content));
        if let Some(text) = &chunk {
            self.emitted_chars += text.chars().count();
        }

        let finish_reason = event.finish_reason().map(str::to_string);
        if finish_reason.is_some() {
            self.finish(finish_reason.clone());
        }

        AccumulatorStep { chunk, finish_reason }
    }

    fn route(&mut self, content: &str) -> Option<String> {
        if self.found_start {
            return Some(content.to_string());
        }

        self.echo_buffer.push_str(content);

        if self.echo_buffer.len() >= self.prompt.len() {
            self.found_start = true;
            let buffered = std::mem::take(&mut self.echo_buffer);
            return match buffered.strip_prefix(self.prompt.as_str()) {
                Some(rest) => {
                    tracing::debug!(chars = self.prompt.chars().count(), "Suppressed prompt echo");
                    (!rest.is_empty()).then(|| rest.to_string())
                }
                None => Some(buffered),
            };
        }

        if !self.prompt.starts_with(self.echo_buffer.as_str()) {
            self.found_start = true;
            return Some(std::mem::take(&mut self.echo_buffer));
        }

        None
    }

    /// Close the accumulator. A buffered strict prefix of the prompt is
    /// discarded.
    pub fn finish(&mut self, finish_reason: Option<String>) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.finish_reason = finish_reason;
        if !self.echo_buffer.is_empty() {
            tracing::debug!(
                chars = self.echo_buffer.chars().count(),
                "Discarding partial prompt echo at end of stream"
            );
            self.echo_buffer.clear();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    /// Characters delivered so far.
    pub fn emitted_chars(&self) -> usize {
        self.emitted_chars
    }

    /// Rough progress estimate: delivered characters divided by chars-per-token.
    pub fn estimated_tokens(&self) -> usize {
        self.emitted_chars / self.chars_per_token
    }
}

#[cfg(test)]
#[path = "accumulator_tests.rs"]
mod tests;
