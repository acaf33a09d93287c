//! System-prompt assembly for the group-chat conversation engine.
//!
//! Split in two: [`style`] resolves the turn's random personality-state and
//! reply-style picks, [`render`] then turns a fully-populated
//! [`PromptContext`] into the final prompt string with no further
//! side effects.

pub mod render;
pub mod style;
pub mod types;

pub use render::render;
pub use style::{pick_personality_state, pick_reply_style};
pub use types::{
    Environment, ExternalSkillEntry, HistoryLine, LoadedSkillEntry, PromptContext,
    TargetMessageView, ToolResultEntry,
};
