//! `Tool` trait shared by the fixed catalog (groupmind-tools) and
//! dynamically loaded skills (groupmind-skills).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ToolDefinition;

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }
}

/// A callable the LLM can invoke. Implementations close over whatever
/// request-scoped context they need (bot gateway, session id, store, …) as
/// struct fields rather than taking it as an `execute` parameter — tools are
/// built fresh for each turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name, qualified with a skill prefix for loaded skills
    /// (`skill_name.tool_name`).
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> serde_json::Value;
    /// Whether the tool's result is re-injected into the next LLM turn.
    fn return_to_ai(&self) -> bool;
    async fn execute(&self, input: serde_json::Value) -> ToolResult;
}

/// Convert a slice of tools into API-level tool definitions for a
/// [`crate::provider::CompletionRequest`].
pub fn to_definitions(tools: &[std::sync::Arc<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters(),
        })
        .collect()
}
