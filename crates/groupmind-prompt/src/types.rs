//! Inputs to the prompt renderer.
//!
//! `PromptContext` is deliberately a plain data bag with no behavior: every
//! field is something the dispatcher/chat-engine already computed (history
//! rows, humanizer outputs, the already-rolled personality/style pick).
//! Keeping it inert is what makes [`crate::render::render`] a pure function.

use groupmind_core::types::{MemberRole, MessageId, SessionType, UserId};

/// One prior tool call's outcome, ready to render into the "tool-results"
/// section — included only when `iteration > 0`.
#[derive(Debug, Clone)]
pub struct ToolResultEntry {
    pub tool_name: String,
    pub content: String,
    pub is_error: bool,
}

/// One skill currently loaded into the session, for the "loaded-skills"
/// listing section.
#[derive(Debug, Clone)]
pub struct LoadedSkillEntry {
    pub skill_name: String,
    pub tool_names: Vec<String>,
}

/// A skill available to load via the `load_skill` tool, for the
/// "external-skills" listing in the response-format section.
#[derive(Debug, Clone)]
pub struct ExternalSkillEntry {
    pub name: String,
    pub description: String,
}

/// Environment facts rendered verbatim into the prompt's "environment"
/// section.
#[derive(Debug, Clone)]
pub struct Environment {
    pub local_time: String,
    pub weekday: String,
    pub chat_type: SessionType,
    pub group_name: Option<String>,
    pub group_size: Option<u32>,
    pub bot_role: MemberRole,
}

/// One line of rendered chat history (the prompt carries at most the last
/// ~30 messages).
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub timestamp: String,
    pub speaker: String,
    pub role: String,
    pub title: Option<String>,
    pub message_id: Option<MessageId>,
    pub content: String,
}

/// The inbound message the current turn is responding to.
#[derive(Debug, Clone)]
pub struct TargetMessageView {
    pub speaker: String,
    pub user_id: UserId,
    pub content: String,
    pub message_id: Option<MessageId>,
}

/// Everything the prompt builder needs to assemble one turn's system
/// prompt. Constructed fresh by the chat engine each iteration (tool
/// results and iteration number are the only fields that change across
/// iterations of the same turn).
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Iteration number within the current bounded tool loop; the
    /// "tool-results" section is only emitted when this is `> 0`.
    pub iteration: u32,
    pub tool_results: Vec<ToolResultEntry>,

    pub loaded_skills: Vec<LoadedSkillEntry>,
    pub expression_context: String,
    pub memory_result: Option<String>,

    pub environment: Environment,
    pub history: Vec<HistoryLine>,
    pub target_message: TargetMessageView,
    pub planner_reason: Option<String>,

    pub persona: String,
    /// Already sampled by the personality picker — `None` if the picker
    /// rolled "no state" or personality is disabled.
    pub personality_state: Option<String>,
    /// Already sampled by the reply-style picker.
    pub reply_style: String,

    pub can_mute: bool,
    pub enable_group_admin: bool,
    pub enable_external_skills: bool,
    pub external_skills: Vec<ExternalSkillEntry>,
}
