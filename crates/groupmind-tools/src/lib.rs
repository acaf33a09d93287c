//! Fixed tool catalog for the group-chat conversation engine.

pub mod catalog;
pub mod context;
pub mod error;
pub mod tools;

pub use catalog::build_catalog;
pub use context::{PendingOutputs, ToolContext};
pub use error::{Result, ToolsError};
pub use tools::{
    AtUserTool, AutoMuteTool, EndSessionTool, GetGroupMemberInfoTool, GetGroupMemberListTool,
    KickMemberTool, LoadSkillTool, MuteMemberTool, PokeUserTool, QuoteReplyTool, ReportAbuseTool,
    SetMemberCardTool, SetMemberTitleTool, ToggleMuteAllTool, UnloadSkillTool,
};
