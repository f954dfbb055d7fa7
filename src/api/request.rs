// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pure construction of completion requests.

use thiserror::Error;

use super::types::{ChatMessage, CompletionRequest, ResponseFormat};
use crate::settings::SamplingConfig;

pub const DEFAULT_SYSTEM_PREAMBLE: &str = "You are a helpful writing assistant. Continue the text \
in a natural way, maintaining the same style and tone. Generate a substantial amount of text, at \
least several paragraphs.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("No model selected")]
    MissingModel,
}

/// Prompt shaping switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub include_system_preamble: bool,
    pub system_preamble: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_system_preamble: false,
            system_preamble: DEFAULT_SYSTEM_PREAMBLE.into(),
        }
    }
}

/// Build a streaming request from the document text and sampling settings.
///
/// The prompt is sent verbatim as the single user message. Fails only when
/// no model is selected; sampling values are passed through unchanged.
pub fn build_request(
    prompt: &str,
    config: &SamplingConfig,
    options: &BuildOptions,
) -> Result<CompletionRequest, BuildError> {
    let model = config.model().ok_or(BuildError::MissingModel)?;

    let mut messages = Vec::with_capacity(2);
    if options.include_system_preamble {
        messages.push(ChatMessage::system(options.system_preamble.clone()));
    }
    messages.push(ChatMessage::user(prompt));

    Ok(CompletionRequest {
        model: model.to_string(),
        messages,
        stream: true,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        top_p: config.top_p,
        top_k: config.top_k,
        response_format: ResponseFormat::text(),
    })
}
