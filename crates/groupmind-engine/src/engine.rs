//! Bounded agentic tool loop.

use std::collections::HashMap;
use std::sync::Arc;

use groupmind_llm::{to_definitions, ChatMessage, CompletionRequest, Role, Tool};
use groupmind_prompt::{render, ToolResultEntry};
use tracing::{instrument, warn};

use crate::types::{resolve_max_iterations, ChatEngineDeps, PromptContextBase, RunChatOutput};

pub struct ChatEngine {
    deps: ChatEngineDeps,
}

impl ChatEngine {
    pub fn new(deps: ChatEngineDeps) -> Self {
        Self { deps }
    }

    /// Visible tools for one iteration: the fixed per-turn catalog plus any
    /// non-expired session skill tools.
    fn visible_tools(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools = self.deps.fixed_tools.clone();
        tools.extend(self.deps.skills.get_tools(&self.deps.session_id));
        tools
    }

    #[instrument(skip(self, base), fields(session_id = %self.deps.session_id))]
    pub async fn run_chat(&self, base: PromptContextBase) -> RunChatOutput {
        let max_iterations = resolve_max_iterations(self.deps.max_iterations);

        let mut last_text = String::new();
        let mut tool_call_count = 0usize;
        let mut tool_results_for_next_prompt: Vec<ToolResultEntry> = Vec::new();

        for iteration in 0..max_iterations {
            let tools = self.visible_tools();
            let tool_map: HashMap<&str, &Arc<dyn Tool>> =
                tools.iter().map(|t| (t.name(), t)).collect();

            let ctx = base.clone().into_prompt_context(
                iteration,
                if iteration > 0 {
                    std::mem::take(&mut tool_results_for_next_prompt)
                } else {
                    Vec::new()
                },
            );
            let prompt = render(&ctx);

            let request = CompletionRequest {
                model: self.deps.model.clone(),
                messages: vec![ChatMessage {
                    role: Role::System,
                    content: prompt,
                }],
                tools: to_definitions(&tools),
                temperature: self.deps.temperature,
                max_tokens: self.deps.max_tokens,
            };

            let response = match self.deps.llm.complete(request).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "chat engine completion failed, stopping turn");
                    break;
                }
            };

            if let Some(text) = response.content {
                last_text = text;
            }

            if response.tool_calls.is_empty() {
                break;
            }

            let mut any_returning = false;
            let mut ended = false;

            for call in &response.tool_calls {
                tool_call_count += 1;
                let args = call.arguments();

                let Some(tool) = tool_map.get(call.name.as_str()) else {
                    warn!(tool = %call.name, "unknown tool requested by model");
                    continue;
                };

                let outcome = tool.execute(args).await;
                if tool.return_to_ai() {
                    any_returning = true;
                    tool_results_for_next_prompt.push(ToolResultEntry {
                        tool_name: call.name.clone(),
                        content: outcome.content,
                        is_error: outcome.is_error,
                    });
                }

                if self.deps.pending.is_ended() {
                    ended = true;
                    break;
                }
            }

            if ended {
                return RunChatOutput {
                    ended: true,
                    end_reason: self.deps.pending.end_reason(),
                    tool_call_count,
                    ..Default::default()
                };
            }

            if !any_returning {
                break;
            }
        }

        let messages = split_outbound(&last_text);
        let emoji_path = self.pick_emoji(&last_text).await;

        RunChatOutput {
            messages,
            pending_ats: self.deps.pending.take_ats(),
            pending_quote: self.deps.pending.take_quote(),
            tool_call_count,
            emoji_path,
            ended: false,
            end_reason: None,
            raw_text: last_text,
        }
    }

    async fn pick_emoji(&self, reply_text: &str) -> Option<std::path::PathBuf> {
        if reply_text.trim().is_empty() {
            return None;
        }
        let emoji = self.deps.emoji.as_ref()?;
        emoji
            .pick_emoji(
                self.deps.llm.as_ref(),
                &self.deps.model,
                self.deps.store.as_ref(),
                reply_text,
            )
            .await
    }
}

/// Split assistant text into outbound messages on lines consisting solely
/// of `---`, trimming and dropping empties.
fn split_outbound(text: &str) -> Vec<String> {
    text.lines()
        .fold(vec![String::new()], |mut acc, line| {
            if line.trim() == "---" {
                acc.push(String::new());
            } else {
                let current = acc.last_mut().unwrap();
                if !current.is_empty() {
                    current.push('\n');
                }
                current.push_str(line);
            }
            acc
        })
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_outbound_drops_empties_and_trims() {
        let text = "hello\n---\n\n---\n  world  \n";
        assert_eq!(split_outbound(text), vec!["hello", "world"]);
    }

    #[test]
    fn split_outbound_single_message_with_no_separator() {
        assert_eq!(split_outbound("just one message"), vec!["just one message"]);
    }

    #[test]
    fn split_outbound_preserves_internal_newlines() {
        let text = "line one\nline two";
        assert_eq!(split_outbound(text), vec!["line one\nline two"]);
    }
}

#[cfg(test)]
mod run_chat_tests {
    use super::*;
    use async_trait::async_trait;
    use groupmind_core::types::{MemberRole, SessionId, SessionType};
    use groupmind_llm::{CompletionResponse, LlmError, ToolResult};
    use groupmind_prompt::{Environment, TargetMessageView};
    use groupmind_tools::PendingOutputs;
    use std::sync::Mutex;
    use tokio::sync::Mutex as AsyncMutex;

    type LResult<T> = std::result::Result<T, LlmError>;

    struct FakeLlm {
        responses: AsyncMutex<std::collections::VecDeque<LResult<CompletionResponse>>>,
    }

    impl FakeLlm {
        fn new(responses: Vec<LResult<CompletionResponse>>) -> Self {
            Self {
                responses: AsyncMutex::new(responses.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl groupmind_llm::LlmClient for FakeLlm {
        fn name(&self) -> &str {
            "fake"
        }
        async fn complete(
            &self,
            _req: CompletionRequest,
        ) -> LResult<CompletionResponse> {
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Backend("no more canned responses".into())))
        }
        async fn generate_text(
            &self,
            _req: groupmind_llm::TextGenRequest,
        ) -> LResult<String> {
            unimplemented!()
        }
        async fn generate_multimodal(
            &self,
            _req: groupmind_llm::MultimodalRequest,
        ) -> LResult<String> {
            unimplemented!()
        }
    }

    fn text_only(content: &str) -> LResult<CompletionResponse> {
        Ok(CompletionResponse {
            content: Some(content.to_string()),
            reasoning: None,
            tool_calls: vec![],
            raw: serde_json::json!({}),
        })
    }

    fn with_tool_call(content: Option<&str>, name: &str, args: &str) -> LResult<CompletionResponse> {
        Ok(CompletionResponse {
            content: content.map(String::from),
            reasoning: None,
            tool_calls: vec![groupmind_llm::ToolCall {
                id: "call_1".to_string(),
                name: name.to_string(),
                arguments_json_str: args.to_string(),
            }],
            raw: serde_json::json!({}),
        })
    }

    struct CountingTool {
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "count"
        }
        fn description(&self) -> &str {
            "increments a counter"
        }
        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn return_to_ai(&self) -> bool {
            true
        }
        async fn execute(&self, _input: serde_json::Value) -> ToolResult {
            *self.calls.lock().unwrap() += 1;
            ToolResult::success("incremented")
        }
    }

    struct EndTool {
        pending: Arc<PendingOutputs>,
    }

    #[async_trait]
    impl Tool for EndTool {
        fn name(&self) -> &str {
            "end_session"
        }
        fn description(&self) -> &str {
            "ends the turn"
        }
        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn return_to_ai(&self) -> bool {
            false
        }
        async fn execute(&self, _input: serde_json::Value) -> ToolResult {
            self.pending.request_end(Some("done".to_string()));
            ToolResult::success("ending")
        }
    }

    struct AtTool {
        pending: Arc<PendingOutputs>,
    }

    #[async_trait]
    impl Tool for AtTool {
        fn name(&self) -> &str {
            "at_user"
        }
        fn description(&self) -> &str {
            "queues an at-mention"
        }
        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn return_to_ai(&self) -> bool {
            false
        }
        async fn execute(&self, input: serde_json::Value) -> ToolResult {
            let user_id = input.get("user_id").and_then(|v| v.as_i64()).unwrap_or(0);
            self.pending.queue_at(user_id);
            ToolResult::success("queued")
        }
    }

    fn base_prompt_context() -> PromptContextBase {
        PromptContextBase {
            loaded_skills: vec![],
            expression_context: String::new(),
            memory_result: None,
            environment: Environment {
                local_time: "10:00".into(),
                weekday: "Tue".into(),
                chat_type: SessionType::Group,
                group_name: Some("lab".into()),
                group_size: Some(5),
                bot_role: MemberRole::Member,
            },
            history: vec![],
            target_message: TargetMessageView {
                speaker: "alice".into(),
                user_id: 1,
                content: "hi".into(),
                message_id: None,
            },
            planner_reason: None,
            persona: "a bot".into(),
            personality_state: None,
            reply_style: "casual".into(),
            can_mute: false,
            enable_group_admin: false,
            enable_external_skills: false,
            external_skills: vec![],
        }
    }

    fn deps_with(llm: FakeLlm, tools: Vec<Arc<dyn Tool>>, max_iterations: i64) -> ChatEngineDeps {
        ChatEngineDeps {
            llm: Arc::new(llm),
            model: "test-model".into(),
            temperature: Some(0.5),
            max_tokens: Some(100),
            max_iterations,
            fixed_tools: tools,
            skills: groupmind_skills::SkillRegistry::new(),
            session_id: SessionId::group(1),
            pending: PendingOutputs::new(),
            store: Arc::new(groupmind_store::Store::open_in_memory().unwrap()),
            emoji: None,
        }
    }

    #[tokio::test]
    async fn breaks_immediately_when_no_tool_calls() {
        let llm = FakeLlm::new(vec![text_only("hello there")]);
        let engine = ChatEngine::new(deps_with(llm, vec![], 20));
        let out = engine.run_chat(base_prompt_context()).await;
        assert_eq!(out.messages, vec!["hello there"]);
        assert!(!out.ended);
    }

    #[tokio::test]
    async fn end_session_tool_stops_the_loop_with_no_messages() {
        let pending = PendingOutputs::new();
        let end_tool: Arc<dyn Tool> = Arc::new(EndTool {
            pending: pending.clone(),
        });
        let llm = FakeLlm::new(vec![with_tool_call(Some("won't be sent"), "end_session", "{}")]);
        let mut deps = deps_with(llm, vec![end_tool], 20);
        deps.pending = pending;
        let engine = ChatEngine::new(deps);
        let out = engine.run_chat(base_prompt_context()).await;
        assert!(out.ended);
        assert_eq!(out.end_reason.as_deref(), Some("done"));
        assert!(out.messages.is_empty());
    }

    #[tokio::test]
    async fn at_user_tool_queues_without_feeding_next_prompt() {
        let pending = PendingOutputs::new();
        let at_tool: Arc<dyn Tool> = Arc::new(AtTool {
            pending: pending.clone(),
        });
        // `at_user` alone is not a "returning" tool, so step
        // 2.g the loop stops after this iteration using whatever text the
        // model already produced in the same turn.
        let llm = FakeLlm::new(vec![with_tool_call(
            Some("hello there"),
            "at_user",
            r#"{"user_id": 42}"#,
        )]);
        let mut deps = deps_with(llm, vec![at_tool], 20);
        deps.pending = pending;
        let engine = ChatEngine::new(deps);
        let out = engine.run_chat(base_prompt_context()).await;
        assert_eq!(out.pending_ats, vec![42]);
        assert_eq!(out.messages, vec!["hello there"]);
    }

    #[tokio::test]
    async fn returning_tool_keeps_the_loop_going() {
        let calls = Arc::new(Mutex::new(0usize));
        let counting_tool: Arc<dyn Tool> = Arc::new(CountingTool {
            calls: calls.clone(),
        });
        let llm = FakeLlm::new(vec![
            with_tool_call(None, "count", "{}"),
            text_only("done after tool use"),
        ]);
        let engine = ChatEngine::new(deps_with(llm, vec![counting_tool], 20));
        let out = engine.run_chat(base_prompt_context()).await;
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(out.messages, vec!["done after tool use"]);
    }

    #[tokio::test]
    async fn iteration_cap_stops_an_infinitely_tool_calling_model() {
        let calls = Arc::new(Mutex::new(0usize));
        let counting_tool: Arc<dyn Tool> = Arc::new(CountingTool {
            calls: calls.clone(),
        });
        let responses = (0..10)
            .map(|_| with_tool_call(None, "count", "{}"))
            .collect();
        let llm = FakeLlm::new(responses);
        let engine = ChatEngine::new(deps_with(llm, vec![counting_tool], 3));
        let out = engine.run_chat(base_prompt_context()).await;
        assert_eq!(*calls.lock().unwrap(), 3);
        assert!(out.messages.is_empty());
    }

    #[tokio::test]
    async fn negative_max_iterations_resolves_to_unbounded_cap() {
        assert_eq!(resolve_max_iterations(-1), crate::types::UNBOUNDED_ITERATION_CAP);
        assert_eq!(resolve_max_iterations(5), 5);
    }
}
