//! Per-turn tool scope (`ToolContext`) and the queue tools use
//! to hand control-flow decisions back to the Chat Engine without a return
//! value of their own (`Tool::execute` only returns a [`groupmind_llm::ToolResult`]
//! destined for the LLM).

use std::sync::{Arc, Mutex};

use groupmind_botapi::BotGateway;
use groupmind_core::config::Config;
use groupmind_core::types::{GroupId, MemberRole, MessageId, SessionId, UserId};
use groupmind_skills::SkillRegistry;
use groupmind_store::Store;

/// Tools that don't feed the LLM (`return_to_ai: false`) instead queue a
/// side effect here for the Chat Engine to pick up after the loop exits.
#[derive(Default)]
pub struct PendingOutputs {
    ats: Mutex<Vec<UserId>>,
    quote: Mutex<Option<MessageId>>,
    ended: Mutex<bool>,
    end_reason: Mutex<Option<String>>,
}

impl PendingOutputs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_at(&self, user_id: UserId) {
        self.ats.lock().unwrap().push(user_id);
    }

    pub fn queue_quote(&self, message_id: MessageId) {
        *self.quote.lock().unwrap() = Some(message_id);
    }

    pub fn request_end(&self, reason: Option<String>) {
        *self.ended.lock().unwrap() = true;
        *self.end_reason.lock().unwrap() = reason;
    }

    pub fn take_ats(&self) -> Vec<UserId> {
        std::mem::take(&mut self.ats.lock().unwrap())
    }

    pub fn take_quote(&self) -> Option<MessageId> {
        self.quote.lock().unwrap().take()
    }

    pub fn is_ended(&self) -> bool {
        *self.ended.lock().unwrap()
    }

    pub fn end_reason(&self) -> Option<String> {
        self.end_reason.lock().unwrap().clone()
    }
}

/// Everything a tool handler needs, bound fresh for each turn: one tool
/// declaration per request.
pub struct ToolContext {
    pub gateway: Arc<dyn BotGateway>,
    pub store: Arc<Store>,
    pub skills: Arc<SkillRegistry>,
    pub config: Arc<Config>,
    pub session_id: SessionId,
    pub group_id: Option<GroupId>,
    /// The user whose message triggered this turn; several tools default
    /// their target to this when the LLM omits `user_id`.
    pub triggering_user_id: UserId,
    pub bot_role: MemberRole,
    pub pending: Arc<PendingOutputs>,
}
