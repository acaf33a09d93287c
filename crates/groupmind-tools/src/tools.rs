//! Fixed tool catalog. Each tool closes over an
//! [`Arc<ToolContext>`] rather than taking context as an `execute`
//! parameter — tools are rebuilt fresh every turn by [`crate::catalog::build_catalog`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use groupmind_botapi::Segment;
use groupmind_llm::{Tool, ToolResult};

use crate::context::ToolContext;

fn arg_i64(input: &Value, key: &str) -> Option<i64> {
    input.get(key).and_then(Value::as_i64)
}

fn arg_str<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str)
}

macro_rules! require_i64 {
    ($input:expr, $key:expr) => {
        match arg_i64($input, $key) {
            Some(v) => v,
            None => return ToolResult::error(format!("'{}' is required", $key)),
        }
    };
}

/// `at_user` — queue an @-mention for the next outbound message.
pub struct AtUserTool {
    ctx: Arc<ToolContext>,
}

impl AtUserTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for AtUserTool {
    fn name(&self) -> &str {
        "at_user"
    }
    fn description(&self) -> &str {
        "Queue an @-mention to attach to the next outgoing message."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        self.ctx.pending.queue_at(user_id);
        ToolResult::success("queued")
    }
}

/// `quote_reply` — queue a quote segment for the next outbound message.
pub struct QuoteReplyTool {
    ctx: Arc<ToolContext>,
}

impl QuoteReplyTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for QuoteReplyTool {
    fn name(&self) -> &str {
        "quote_reply"
    }
    fn description(&self) -> &str {
        "Queue a quoted-message segment to attach to the next outgoing message."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"message_id": {"type": "integer"}},
            "required": ["message_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let message_id = require_i64!(&input, "message_id");
        self.ctx.pending.queue_quote(message_id);
        ToolResult::success("queued")
    }
}

/// `end_session` — terminate the tool loop immediately, emitting nothing.
pub struct EndSessionTool {
    ctx: Arc<ToolContext>,
}

impl EndSessionTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for EndSessionTool {
    fn name(&self) -> &str {
        "end_session"
    }
    fn description(&self) -> &str {
        "Stop responding in this turn without emitting any message."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"reason": {"type": "string"}}
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let reason = arg_str(&input, "reason").map(String::from);
        self.ctx.pending.request_end(reason);
        ToolResult::success("ending")
    }
}

/// `report_abuse` — DM the bot owners configured in `Config::bot_owners`.
pub struct ReportAbuseTool {
    ctx: Arc<ToolContext>,
}

impl ReportAbuseTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ReportAbuseTool {
    fn name(&self) -> &str {
        "report_abuse"
    }
    fn description(&self) -> &str {
        "Report a member's abusive behavior to the bot's owners."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "integer"},
                "reason": {"type": "string"}
            },
            "required": ["user_id", "reason"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let reason = arg_str(&input, "reason").unwrap_or("no reason given");

        if self.ctx.config.bot_owners.is_empty() {
            return ToolResult::error("no bot owners configured to report to");
        }

        let text = format!("abuse report: user {user_id} in this chat — {reason}");
        let mut failures = 0;
        for owner in &self.ctx.config.bot_owners {
            if self
                .ctx
                .gateway
                .send_private_msg(*owner, vec![Segment::text(text.clone())])
                .await
                .is_err()
            {
                failures += 1;
            }
        }
        if failures == self.ctx.config.bot_owners.len() {
            ToolResult::error("failed to notify any bot owner")
        } else {
            ToolResult::success("report sent")
        }
    }
}

/// `auto_mute` — 60 second mute; only visible in groups where the bot is
/// an admin (gated by [`crate::catalog::build_catalog`]).
pub struct AutoMuteTool {
    ctx: Arc<ToolContext>,
}

impl AutoMuteTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

const AUTO_MUTE_SECONDS: u64 = 60;

#[async_trait]
impl Tool for AutoMuteTool {
    fn name(&self) -> &str {
        "auto_mute"
    }
    fn description(&self) -> &str {
        "Mute a member for 60 seconds."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self
            .ctx
            .gateway
            .set_group_ban(group_id, user_id, AUTO_MUTE_SECONDS)
            .await
        {
            Ok(()) => ToolResult::success("member muted for 60s"),
            Err(e) => ToolResult::error(format!("mute failed: {e}")),
        }
    }
}

/// `mute_member` — admin-only mute for an arbitrary duration.
pub struct MuteMemberTool {
    ctx: Arc<ToolContext>,
}

impl MuteMemberTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for MuteMemberTool {
    fn name(&self) -> &str {
        "mute_member"
    }
    fn description(&self) -> &str {
        "Mute a member for the given number of seconds."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "integer"},
                "duration_s": {"type": "integer"}
            },
            "required": ["user_id", "duration_s"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let duration_s = require_i64!(&input, "duration_s").max(0) as u64;
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self
            .ctx
            .gateway
            .set_group_ban(group_id, user_id, duration_s)
            .await
        {
            Ok(()) => ToolResult::success(format!("member muted for {duration_s}s")),
            Err(e) => ToolResult::error(format!("mute failed: {e}")),
        }
    }
}

/// `kick_member` — admin-only.
pub struct KickMemberTool {
    ctx: Arc<ToolContext>,
}

impl KickMemberTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for KickMemberTool {
    fn name(&self) -> &str {
        "kick_member"
    }
    fn description(&self) -> &str {
        "Remove a member from the group."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self.ctx.gateway.set_group_kick(group_id, user_id).await {
            Ok(()) => ToolResult::success("member kicked"),
            Err(e) => ToolResult::error(format!("kick failed: {e}")),
        }
    }
}

/// `set_member_card` — admin-only.
pub struct SetMemberCardTool {
    ctx: Arc<ToolContext>,
}

impl SetMemberCardTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SetMemberCardTool {
    fn name(&self) -> &str {
        "set_member_card"
    }
    fn description(&self) -> &str {
        "Set a member's group display name (card)."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "integer"},
                "card": {"type": "string"}
            },
            "required": ["user_id", "card"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let card = arg_str(&input, "card").unwrap_or("").to_string();
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self
            .ctx
            .gateway
            .set_group_card(group_id, user_id, card)
            .await
        {
            Ok(()) => ToolResult::success("card updated"),
            Err(e) => ToolResult::error(format!("set_member_card failed: {e}")),
        }
    }
}

/// `set_member_title` — owner-only (gated in [`crate::catalog::build_catalog`]).
pub struct SetMemberTitleTool {
    ctx: Arc<ToolContext>,
}

impl SetMemberTitleTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SetMemberTitleTool {
    fn name(&self) -> &str {
        "set_member_title"
    }
    fn description(&self) -> &str {
        "Set a member's special title (owner only)."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "integer"},
                "title": {"type": "string"}
            },
            "required": ["user_id", "title"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let title = arg_str(&input, "title").unwrap_or("").to_string();
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self
            .ctx
            .gateway
            .set_group_special_title(group_id, user_id, title)
            .await
        {
            Ok(()) => ToolResult::success("title updated"),
            Err(e) => ToolResult::error(format!("set_member_title failed: {e}")),
        }
    }
}

/// `toggle_mute_all` — admin-only.
pub struct ToggleMuteAllTool {
    ctx: Arc<ToolContext>,
}

impl ToggleMuteAllTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ToggleMuteAllTool {
    fn name(&self) -> &str {
        "toggle_mute_all"
    }
    fn description(&self) -> &str {
        "Enable or disable whole-group mute."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"enable": {"type": "boolean"}},
            "required": ["enable"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let enable = input
            .get("enable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self.ctx.gateway.set_group_whole_ban(group_id, enable).await {
            Ok(()) => ToolResult::success(if enable { "muted all" } else { "unmuted all" }),
            Err(e) => ToolResult::error(format!("toggle_mute_all failed: {e}")),
        }
    }
}

/// `poke_user` — send a group poke; does not feed back into the prompt.
pub struct PokeUserTool {
    ctx: Arc<ToolContext>,
}

impl PokeUserTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for PokeUserTool {
    fn name(&self) -> &str {
        "poke_user"
    }
    fn description(&self) -> &str {
        "Send a poke to a member of this group."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self.ctx.gateway.group_poke(group_id, user_id).await {
            Ok(()) => ToolResult::success("poked"),
            Err(e) => ToolResult::error(format!("poke failed: {e}")),
        }
    }
}

/// `get_group_member_info`.
pub struct GetGroupMemberInfoTool {
    ctx: Arc<ToolContext>,
}

impl GetGroupMemberInfoTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetGroupMemberInfoTool {
    fn name(&self) -> &str {
        "get_group_member_info"
    }
    fn description(&self) -> &str {
        "Look up a group member's role, card, and title."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"user_id": {"type": "integer"}},
            "required": ["user_id"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let user_id = require_i64!(&input, "user_id");
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self
            .ctx
            .gateway
            .get_group_member_info(group_id, user_id)
            .await
        {
            Ok(info) => match serde_json::to_string(&info) {
                Ok(s) => ToolResult::success(s),
                Err(e) => ToolResult::error(format!("serialization failed: {e}")),
            },
            Err(e) => ToolResult::error(format!("lookup failed: {e}")),
        }
    }
}

/// `get_group_member_list` — returns first 50 members plus the true total.
pub struct GetGroupMemberListTool {
    ctx: Arc<ToolContext>,
}

impl GetGroupMemberListTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetGroupMemberListTool {
    fn name(&self) -> &str {
        "get_group_member_list"
    }
    fn description(&self) -> &str {
        "List this group's members (first 50) and the total member count."
    }
    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, _input: Value) -> ToolResult {
        let Some(group_id) = self.ctx.group_id else {
            return ToolResult::error("not in a group chat");
        };
        match self.ctx.gateway.get_group_member_list(group_id).await {
            Ok(mut list) => {
                list.members.truncate(50);
                match serde_json::to_string(&list) {
                    Ok(s) => ToolResult::success(s),
                    Err(e) => ToolResult::error(format!("serialization failed: {e}")),
                }
            }
            Err(e) => ToolResult::error(format!("lookup failed: {e}")),
        }
    }
}

/// `load_skill` — meta tool, visible only when `enable_external_skills`.
pub struct LoadSkillTool {
    ctx: Arc<ToolContext>,
}

impl LoadSkillTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for LoadSkillTool {
    fn name(&self) -> &str {
        "load_skill"
    }
    fn description(&self) -> &str {
        "Load an external skill's tools into this session for one hour."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"skill_name": {"type": "string"}},
            "required": ["skill_name"]
        })
    }
    fn return_to_ai(&self) -> bool {
        true
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let Some(skill_name) = arg_str(&input, "skill_name") else {
            return ToolResult::error("'skill_name' is required");
        };
        match self.ctx.skills.load_skill(&self.ctx.session_id, skill_name) {
            Ok(()) => ToolResult::success(format!("loaded skill '{skill_name}'")),
            Err(e) => ToolResult::error(format!("load_skill failed: {e}")),
        }
    }
}

/// `unload_skill` — meta tool, visible only when `enable_external_skills`.
pub struct UnloadSkillTool {
    ctx: Arc<ToolContext>,
}

impl UnloadSkillTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for UnloadSkillTool {
    fn name(&self) -> &str {
        "unload_skill"
    }
    fn description(&self) -> &str {
        "Unload a previously loaded skill from this session."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"skill_name": {"type": "string"}},
            "required": ["skill_name"]
        })
    }
    fn return_to_ai(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> ToolResult {
        let Some(skill_name) = arg_str(&input, "skill_name") else {
            return ToolResult::error("'skill_name' is required");
        };
        self.ctx.skills.unload_skill(&self.ctx.session_id, skill_name);
        ToolResult::success(format!("unloaded skill '{skill_name}'"))
    }
}
