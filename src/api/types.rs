// Copyright 2024-2026 Notebook Core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire types for requests, streamed events and the model list.

use serde::{Deserialize, Deserializer, Serialize};

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ROLE_SYSTEM.into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ROLE_USER.into(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self { kind: "text".into() }
    }
}

/// Streaming chat-completion request body. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) stream: bool,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    pub(crate) top_p: f32,
    pub(crate) top_k: u32,
    pub(crate) response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Content of the final user message.
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ROLE_USER)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Option<StreamDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Error object some providers send mid-stream instead of closing with a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// One decoded `data:` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub error: Option<StreamErrorBody>,
}

impl StreamEvent {
    /// Non-empty delta content of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }

    /// Event carrying a single content delta.
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            choices: vec![StreamChoice {
                delta: Some(StreamDelta { role: None, content: Some(content.into()) }),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Event carrying only a finish reason.
    pub fn finished(reason: impl Into<String>) -> Self {
        Self {
            choices: vec![StreamChoice {
                finish_reason: Some(reason.into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}

/// Per-token prices. Providers send these as numbers or decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, deserialize_with = "deserialize_price")]
    pub prompt: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub completion: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Number(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<PriceRepr>::deserialize(deserializer)? {
        Some(PriceRepr::Number(n)) => Some(n),
        Some(PriceRepr::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None, description: None, pricing: None, context_length: None }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Model list entry as received; entries without an id are dropped.
#[derive(Debug, Clone, Deserialize)]
struct ModelRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pricing: Option<Pricing>,
    #[serde(default)]
    context_length: Option<u64>,
}

/// Body of `GET /models`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelRecord>,
}

impl ModelsResponse {
    pub fn into_descriptors(self) -> Vec<ModelDescriptor> {
        self.data
            .into_iter()
            .filter_map(|r| {
                let id = r.id.filter(|id| !id.trim().is_empty())?;
                Some(ModelDescriptor {
                    id,
                    name: r.name,
                    description: r.description,
                    pricing: r.pricing,
                    context_length: r.context_length,
                })
            })
            .collect()
    }
}
