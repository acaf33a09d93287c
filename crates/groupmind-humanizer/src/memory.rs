//! Memory Retrieval — a two-stage "ReAct" lookup run before the main chat
//! turn. Stage 1 decides whether retrieval is needed at
//! all; stage 2 drives a small bounded tool-calling loop against the store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

pub use groupmind_core::config::MemoryConfig as MemoryRetrievalConfig;
use groupmind_core::types::{SessionId, UserId};
use groupmind_llm::{ChatMessage, CompletionRequest, LlmClient, Tool, ToolDefinition, ToolResult};
use groupmind_store::Store;

use crate::error::Result;

const NO_RETRIEVAL_SENTINEL: &str = "NO_RETRIEVAL_NEEDED";
const HISTORY_WINDOW: usize = 15;

/// `search_chat_history(keyword)` — substring search within the session.
struct SearchChatHistoryTool {
    store: std::sync::Arc<Store>,
    session_id: SessionId,
}

#[async_trait]
impl Tool for SearchChatHistoryTool {
    fn name(&self) -> &str {
        "search_chat_history"
    }
    fn description(&self) -> &str {
        "Search this conversation's history for messages containing a keyword."
    }
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"keyword": {"type": "string"}},
            "required": ["keyword"],
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(keyword) = input.get("keyword").and_then(|v| v.as_str()) else {
            return ToolResult::error("missing required parameter: keyword");
        };
        match self.store.search_messages(&self.session_id, keyword, 10) {
            Ok(rows) => {
                let text = rows
                    .iter()
                    .map(|m| format!("{}: {}", m.user_name.as_deref().unwrap_or("?"), m.content))
                    .collect::<Vec<_>>()
                    .join("\n");
                ToolResult::success(if text.is_empty() { "no matches".to_string() } else { text })
            }
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// `search_user_history(user_id)` — recent messages from a specific user,
/// across the session that user belongs to.
struct SearchUserHistoryTool {
    store: std::sync::Arc<Store>,
    session_id: SessionId,
}

#[async_trait]
impl Tool for SearchUserHistoryTool {
    fn name(&self) -> &str {
        "search_user_history"
    }
    fn description(&self) -> &str {
        "Retrieve recent messages authored by a specific user in this session."
    }
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"],
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        let Some(user_id) = input.get("user_id").and_then(|v| v.as_i64()) else {
            return ToolResult::error("missing required parameter: user_id");
        };
        match self
            .store
            .get_messages_by_user(user_id as UserId, Some(&self.session_id), 10)
        {
            Ok(rows) => {
                let text = rows
                    .iter()
                    .map(|m| m.content.clone())
                    .collect::<Vec<_>>()
                    .join("\n");
                ToolResult::success(if text.is_empty() { "no history".to_string() } else { text })
            }
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// `found_answer(answer, found)` — terminates the search agent's loop.
struct FoundAnswerTool;

#[async_trait]
impl Tool for FoundAnswerTool {
    fn name(&self) -> &str {
        "found_answer"
    }
    fn description(&self) -> &str {
        "Call this once you have determined whether the question can be answered \
         from the retrieved history. Set found=false if nothing relevant turned up."
    }
    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "answer": {"type": "string"},
                "found": {"type": "boolean"},
            },
            "required": ["found"],
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, _input: serde_json::Value) -> ToolResult {
        ToolResult::success("")
    }
}

/// Stage 1: ask the LLM whether retrieval is worth running at all.
pub async fn generate_question(
    llm: &dyn LlmClient,
    model: &str,
    history: &[ChatMessage],
    sender_name: &str,
    trigger_text: &str,
) -> Result<Option<String>> {
    let recent: Vec<ChatMessage> = history
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .rev()
        .cloned()
        .collect();

    let mut messages = vec![ChatMessage::system(
        "Decide whether answering the upcoming message requires searching past \
         conversation history. If yes, emit one concise search question. If no, \
         reply with exactly NO_RETRIEVAL_NEEDED.",
    )];
    messages.extend(recent);
    messages.push(ChatMessage::user(format!("{sender_name}: {trigger_text}")));

    let response = llm
        .complete(CompletionRequest {
            model: model.to_string(),
            messages,
            tools: vec![],
            temperature: Some(0.2),
            max_tokens: Some(128),
        })
        .await?;

    let text = response.content.unwrap_or_default();
    if text.contains(NO_RETRIEVAL_SENTINEL) {
        Ok(None)
    } else {
        let trimmed = text.trim();
        Ok(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) })
    }
}

/// Stage 2: drive the bounded search agent. Returns `None` if nothing was
/// found, the budget expired, or the iteration cap was hit with no
/// accumulated output.
pub async fn run_search_agent(
    llm: &dyn LlmClient,
    model: &str,
    store: std::sync::Arc<Store>,
    session_id: &SessionId,
    question: &str,
    cfg: &MemoryRetrievalConfig,
) -> Result<Option<String>> {
    let search_history = SearchChatHistoryTool {
        store: std::sync::Arc::clone(&store),
        session_id: session_id.clone(),
    };
    let search_user = SearchUserHistoryTool {
        store: std::sync::Arc::clone(&store),
        session_id: session_id.clone(),
    };
    let found_answer = FoundAnswerTool;

    let tool_defs: Vec<ToolDefinition> = vec![
        ToolDefinition {
            name: search_history.name().to_string(),
            description: search_history.description().to_string(),
            parameters: search_history.parameters(),
        },
        ToolDefinition {
            name: search_user.name().to_string(),
            description: search_user.description().to_string(),
            parameters: search_user.parameters(),
        },
        ToolDefinition {
            name: found_answer.name().to_string(),
            description: found_answer.description().to_string(),
            parameters: found_answer.parameters(),
        },
    ];

    let mut messages = vec![
        ChatMessage::system(
            "You are a focused memory search agent. Use the search tools to find \
             information relevant to the question, then call found_answer.",
        ),
        ChatMessage::user(question),
    ];

    let deadline = Instant::now() + Duration::from_millis(cfg.timeout_ms);
    let mut accumulated = String::new();

    for iteration in 0..cfg.max_iterations {
        if Instant::now() >= deadline {
            warn!(iteration, "memory retrieval hit wall-clock budget");
            break;
        }

        let response = llm
            .complete(CompletionRequest {
                model: model.to_string(),
                messages: messages.clone(),
                tools: tool_defs.clone(),
                temperature: Some(0.1),
                max_tokens: Some(256),
            })
            .await?;

        if response.tool_calls.is_empty() {
            break;
        }

        for call in &response.tool_calls {
            let args = call.arguments();
            match call.name.as_str() {
                "found_answer" => {
                    let found = args.get("found").and_then(|v| v.as_bool()).unwrap_or(false);
                    if found {
                        let answer = args
                            .get("answer")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default();
                        return Ok(Some(answer.to_string()));
                    }
                    return Ok(None);
                }
                "search_chat_history" => {
                    let result = search_history.execute(args).await;
                    accumulated.push_str(&result.content);
                    accumulated.push('\n');
                    messages.push(ChatMessage::user(format!(
                        "[{}] {}",
                        call.name, result.content
                    )));
                }
                "search_user_history" => {
                    let result = search_user.execute(args).await;
                    accumulated.push_str(&result.content);
                    accumulated.push('\n');
                    messages.push(ChatMessage::user(format!(
                        "[{}] {}",
                        call.name, result.content
                    )));
                }
                other => {
                    debug!(tool = other, "memory search agent called unknown tool");
                }
            }
        }
    }

    Ok(if accumulated.trim().is_empty() {
        None
    } else {
        Some(accumulated.trim().to_string())
    })
}
