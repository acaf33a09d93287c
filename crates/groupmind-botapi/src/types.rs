//! Bot gateway wire types. A tagged variant for heterogeneous
//! segment content.

use serde::{Deserialize, Serialize};

use groupmind_core::types::{GroupId, MemberRole, MessageId, UserId};

/// Source of an outbound/inbound image segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    File(String),
    Url(String),
}

/// A single piece of message content: plain text, an @mention, an image,
/// or a quoted reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text(String),
    At(UserId),
    Image(ImageSource),
    Reply(MessageId),
}

impl Segment {
    pub fn text(s: impl Into<String>) -> Self {
        Segment::Text(s.into())
    }
}

/// A member's standing info, as returned by `get_group_member_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberInfo {
    pub user_id: UserId,
    pub nickname: String,
    /// Group-local display name override ("card").
    pub card: String,
    pub role: MemberRole,
    pub title: Option<String>,
}

impl MemberInfo {
    /// The name this member should be addressed by in prompts: card if set,
    /// else nickname.
    pub fn display_name(&self) -> &str {
        if self.card.trim().is_empty() {
            &self.nickname
        } else {
            &self.card
        }
    }
}

/// Group metadata, as returned by `get_group_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: GroupId,
    pub group_name: String,
    pub member_count: u32,
    pub max_member_count: u32,
}

/// `get_group_member_list` result — first page plus the true total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberList {
    pub members: Vec<MemberInfo>,
    pub total: usize,
}

/// A message as returned by `get_msg` / `get_group_msg_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedMessage {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub group_id: Option<GroupId>,
    pub segments: Vec<Segment>,
    pub raw_text: String,
    pub timestamp: i64,
}

/// An inbound message event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: MessageId,
    /// `None` for a private/personal-session message.
    pub group_id: Option<GroupId>,
    pub sender_id: UserId,
    pub sender_name: String,
    pub sender_role: Option<MemberRole>,
    pub sender_title: Option<String>,
    pub segments: Vec<Segment>,
    pub raw_text: String,
    pub timestamp: i64,
}

impl InboundMessage {
    pub fn is_group(&self) -> bool {
        self.group_id.is_some()
    }
}

/// An inbound `notice.group.poke` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPoke {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub target_id: UserId,
    pub timestamp: i64,
}

/// Every event kind the dispatcher listens for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InboundEvent {
    Message(InboundMessage),
    GroupPoke(GroupPoke),
}
