//! Chat Engine inputs/outputs.

use std::path::PathBuf;
use std::sync::Arc;

use groupmind_core::types::{MessageId, UserId};
use groupmind_llm::{LlmClient, Tool};
use groupmind_prompt::{
    Environment, ExternalSkillEntry, HistoryLine, LoadedSkillEntry, PromptContext,
    TargetMessageView, ToolResultEntry,
};
use groupmind_skills::SkillRegistry;
use groupmind_store::Store;
use groupmind_tools::PendingOutputs;

/// Chat Engine max iteration cap applied when the configured
/// `max_iterations` is negative ("unbounded") — a truly unbounded loop
/// would let a misbehaving model run the turn forever.
pub const UNBOUNDED_ITERATION_CAP: u32 = 64;

/// Resolve `Config::max_iterations` to a concrete loop bound.
pub fn resolve_max_iterations(configured: i64) -> u32 {
    if configured < 0 {
        UNBOUNDED_ITERATION_CAP
    } else {
        configured as u32
    }
}

/// Every part of [`PromptContext`] that is fixed for the whole turn — only
/// `iteration` and `tool_results` vary across loop iterations.
#[derive(Debug, Clone)]
pub struct PromptContextBase {
    pub loaded_skills: Vec<LoadedSkillEntry>,
    pub expression_context: String,
    pub memory_result: Option<String>,
    pub environment: Environment,
    pub history: Vec<HistoryLine>,
    pub target_message: TargetMessageView,
    pub planner_reason: Option<String>,
    pub persona: String,
    pub personality_state: Option<String>,
    pub reply_style: String,
    pub can_mute: bool,
    pub enable_group_admin: bool,
    pub enable_external_skills: bool,
    pub external_skills: Vec<ExternalSkillEntry>,
}

impl PromptContextBase {
    pub fn into_prompt_context(
        self,
        iteration: u32,
        tool_results: Vec<ToolResultEntry>,
    ) -> PromptContext {
        PromptContext {
            iteration,
            tool_results,
            loaded_skills: self.loaded_skills,
            expression_context: self.expression_context,
            memory_result: self.memory_result,
            environment: self.environment,
            history: self.history,
            target_message: self.target_message,
            planner_reason: self.planner_reason,
            persona: self.persona,
            personality_state: self.personality_state,
            reply_style: self.reply_style,
            can_mute: self.can_mute,
            enable_group_admin: self.enable_group_admin,
            enable_external_skills: self.enable_external_skills,
            external_skills: self.external_skills,
        }
    }
}

/// Everything `run_chat` needs that isn't prompt content.
pub struct ChatEngineDeps {
    pub llm: Arc<dyn LlmClient>,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Raw config value; `< 0` means "unbounded", resolved internally via
    /// [`resolve_max_iterations`].
    pub max_iterations: i64,
    /// The fixed per-turn catalog, already visibility-filtered by
    /// `groupmind_tools::build_catalog` (admin/meta gating is the caller's
    /// job, not the engine's).
    pub fixed_tools: Vec<Arc<dyn Tool>>,
    pub skills: Arc<SkillRegistry>,
    pub session_id: groupmind_core::types::SessionId,
    pub pending: Arc<PendingOutputs>,
    pub store: Arc<Store>,
    /// `None` when the emoji system is disabled in config.
    pub emoji: Option<Arc<groupmind_humanizer::EmojiSystem>>,
}

/// Result of running the bounded tool loop.
#[derive(Debug, Clone, Default)]
pub struct RunChatOutput {
    /// Outbound message bodies, split on lone `---` lines.
    pub messages: Vec<String>,
    pub pending_ats: Vec<UserId>,
    pub pending_quote: Option<MessageId>,
    pub tool_call_count: usize,
    pub emoji_path: Option<PathBuf>,
    /// Set when `end_session` was invoked; callers should emit nothing.
    pub ended: bool,
    pub end_reason: Option<String>,
    /// Raw, unsplit assistant text — what gets persisted as the assistant
    /// message.
    pub raw_text: String,
}
