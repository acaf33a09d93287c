pub mod error;
pub mod provider;
pub mod tools;

pub use error::LlmError;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, LlmClient,
    MultimodalMessage, MultimodalRequest, Role, TextGenRequest, ToolCall, ToolDefinition,
};
pub use tools::{Tool, ToolResult};
