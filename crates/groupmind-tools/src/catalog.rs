//! Builds the visible tool set for one turn, applying role-based
//! visibility rules (admin tools gated on group + config + bot role; meta
//! tools gated on `enable_external_skills`) on top of the fixed catalog.

use std::sync::Arc;

use groupmind_core::types::MemberRole;
use groupmind_llm::Tool;

use crate::context::ToolContext;
use crate::tools::{
    AtUserTool, AutoMuteTool, EndSessionTool, GetGroupMemberInfoTool, GetGroupMemberListTool,
    KickMemberTool, LoadSkillTool, MuteMemberTool, PokeUserTool, QuoteReplyTool, ReportAbuseTool,
    SetMemberCardTool, SetMemberTitleTool, ToggleMuteAllTool, UnloadSkillTool,
};

/// Build the fixed catalog for this turn's `ToolContext`. Session skill
/// tools are added separately by the Chat Engine, on top of this fixed
/// catalog.
pub fn build_catalog(ctx: &Arc<ToolContext>) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(AtUserTool::new(ctx.clone())),
        Arc::new(QuoteReplyTool::new(ctx.clone())),
        Arc::new(EndSessionTool::new(ctx.clone())),
        Arc::new(ReportAbuseTool::new(ctx.clone())),
        Arc::new(PokeUserTool::new(ctx.clone())),
        Arc::new(GetGroupMemberInfoTool::new(ctx.clone())),
        Arc::new(GetGroupMemberListTool::new(ctx.clone())),
    ];

    let admin_visible = ctx.group_id.is_some()
        && ctx.config.enable_group_admin
        && matches!(ctx.bot_role, MemberRole::Admin | MemberRole::Owner);

    if admin_visible {
        tools.push(Arc::new(AutoMuteTool::new(ctx.clone())));
        tools.push(Arc::new(MuteMemberTool::new(ctx.clone())));
        tools.push(Arc::new(KickMemberTool::new(ctx.clone())));
        tools.push(Arc::new(SetMemberCardTool::new(ctx.clone())));
        tools.push(Arc::new(ToggleMuteAllTool::new(ctx.clone())));
        if ctx.bot_role == MemberRole::Owner {
            tools.push(Arc::new(SetMemberTitleTool::new(ctx.clone())));
        }
    }

    if ctx.config.enable_external_skills {
        tools.push(Arc::new(LoadSkillTool::new(ctx.clone())));
        tools.push(Arc::new(UnloadSkillTool::new(ctx.clone())));
    }

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PendingOutputs;
    use groupmind_botapi::{BotGateway, FetchedMessage, GroupInfo, MemberInfo, MemberList};
    use groupmind_botapi::error::Result as GatewayResult;
    use groupmind_core::config::Config;
    use groupmind_core::types::{GroupId, MessageId, SessionId, UserId};
    use groupmind_skills::SkillRegistry;
    use groupmind_store::Store;

    struct NoopGateway;

    #[async_trait::async_trait]
    impl BotGateway for NoopGateway {
        async fn send_group_msg(
            &self,
            _group_id: GroupId,
            _segments: Vec<groupmind_botapi::Segment>,
        ) -> GatewayResult<MessageId> {
            Ok(1)
        }
        async fn send_private_msg(
            &self,
            _user_id: UserId,
            _segments: Vec<groupmind_botapi::Segment>,
        ) -> GatewayResult<MessageId> {
            Ok(1)
        }
        async fn get_msg(&self, _message_id: MessageId) -> GatewayResult<FetchedMessage> {
            unimplemented!()
        }
        async fn get_group_info(&self, _group_id: GroupId) -> GatewayResult<GroupInfo> {
            unimplemented!()
        }
        async fn get_group_member_info(
            &self,
            _group_id: GroupId,
            _user_id: UserId,
        ) -> GatewayResult<MemberInfo> {
            unimplemented!()
        }
        async fn get_group_member_list(&self, _group_id: GroupId) -> GatewayResult<MemberList> {
            unimplemented!()
        }
        async fn get_group_msg_history(
            &self,
            _group_id: GroupId,
            _count: u32,
        ) -> GatewayResult<Vec<FetchedMessage>> {
            Ok(vec![])
        }
        async fn set_group_ban(
            &self,
            _group_id: GroupId,
            _user_id: UserId,
            _seconds: u64,
        ) -> GatewayResult<()> {
            Ok(())
        }
        async fn set_group_kick(&self, _group_id: GroupId, _user_id: UserId) -> GatewayResult<()> {
            Ok(())
        }
        async fn set_group_card(
            &self,
            _group_id: GroupId,
            _user_id: UserId,
            _card: String,
        ) -> GatewayResult<()> {
            Ok(())
        }
        async fn set_group_special_title(
            &self,
            _group_id: GroupId,
            _user_id: UserId,
            _title: String,
        ) -> GatewayResult<()> {
            Ok(())
        }
        async fn set_group_whole_ban(&self, _group_id: GroupId, _enable: bool) -> GatewayResult<()> {
            Ok(())
        }
        async fn group_poke(&self, _group_id: GroupId, _user_id: UserId) -> GatewayResult<()> {
            Ok(())
        }
    }

    fn ctx_with(bot_role: MemberRole, enable_group_admin: bool, group_id: Option<GroupId>) -> Arc<ToolContext> {
        let mut config = Config::default();
        config.enable_group_admin = enable_group_admin;
        Arc::new(ToolContext {
            gateway: Arc::new(NoopGateway),
            store: Arc::new(Store::open_in_memory().unwrap()),
            skills: SkillRegistry::new(),
            config: Arc::new(config),
            session_id: SessionId::group(1),
            group_id,
            triggering_user_id: 42,
            bot_role,
            pending: PendingOutputs::new(),
        })
    }

    fn names(tools: &[Arc<dyn Tool>]) -> Vec<&str> {
        tools.iter().map(|t| t.name()).collect()
    }

    #[test]
    fn admin_tools_hidden_for_plain_member() {
        let ctx = ctx_with(MemberRole::Member, true, Some(1));
        let tools = build_catalog(&ctx);
        assert!(!names(&tools).contains(&"mute_member"));
    }

    #[test]
    fn admin_tools_hidden_when_config_disabled() {
        let ctx = ctx_with(MemberRole::Admin, false, Some(1));
        let tools = build_catalog(&ctx);
        assert!(!names(&tools).contains(&"mute_member"));
    }

    #[test]
    fn admin_tools_hidden_outside_group() {
        let ctx = ctx_with(MemberRole::Owner, true, None);
        let tools = build_catalog(&ctx);
        assert!(!names(&tools).contains(&"mute_member"));
    }

    #[test]
    fn admin_tools_visible_for_admin_in_group() {
        let ctx = ctx_with(MemberRole::Admin, true, Some(1));
        let tools = build_catalog(&ctx);
        assert!(names(&tools).contains(&"mute_member"));
        assert!(!names(&tools).contains(&"set_member_title"));
    }

    #[test]
    fn set_member_title_only_for_owner() {
        let ctx = ctx_with(MemberRole::Owner, true, Some(1));
        let tools = build_catalog(&ctx);
        assert!(names(&tools).contains(&"set_member_title"));
    }

    #[test]
    fn meta_tools_hidden_by_default() {
        let ctx = ctx_with(MemberRole::Member, false, Some(1));
        let tools = build_catalog(&ctx);
        assert!(!names(&tools).contains(&"load_skill"));
    }
}
