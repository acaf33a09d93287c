//! The LLM client contract — an interface only. Concrete
//! providers (Anthropic/OpenAI/etc. HTTP wrappers) live in the surrounding
//! repository's "generic LLM-client wrapper", which is out of scope here
//!.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn in a conversation sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// One part of a multimodal message ( `generate_multimodal`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: String },
}

/// A multimodal message — role plus an ordered list of content parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

/// A tool definition advertised to the model ( `Tool`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model. `arguments_json_str` is kept as
/// the raw string the model produced — callers parse it themselves, since a
/// malformed string is a recoverable per-call condition, not a
/// reason to fail the whole completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments_json_str: String,
}

impl ToolCall {
    /// Parse `arguments_json_str`, falling back to an empty object on
    /// failure.
    pub fn arguments(&self) -> serde_json::Value {
        serde_json::from_str(&self.arguments_json_str).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// Request for a tool-calling completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Response to a tool-calling completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub raw: serde_json::Value,
}

/// Plain-text generation request (no tool use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenRequest {
    pub prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Multimodal (image + text) generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalRequest {
    pub messages: Vec<MultimodalMessage>,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Common interface every LLM backend implements.
///
/// Tool-result messages for every emitted `tool_call_id` MUST be pushed back
/// on the next `complete` call — see groupmind-engine's tool loop, which is
/// the sole caller responsible for honoring that wire-protocol requirement.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse>;

    async fn generate_text(&self, req: TextGenRequest) -> Result<String>;

    async fn generate_multimodal(&self, req: MultimodalRequest) -> Result<String>;
}
