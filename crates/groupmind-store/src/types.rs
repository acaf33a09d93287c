use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use groupmind_core::types::{Emotion, GroupId, MemberRole, MessageRole, SessionId, UserId};

/// Identity of a conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub target_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub compressed_context: Option<String>,
}

/// An immutable append-only conversation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_role: Option<MemberRole>,
    pub user_title: Option<String>,
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message_id: Option<i64>,
}

/// A message awaiting an id and a timestamp, built by the caller.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_role: Option<MemberRole>,
    pub user_title: Option<String>,
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
    pub message_id: Option<i64>,
}

impl NewMessage {
    pub fn new(session_id: SessionId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            session_id,
            role,
            content: content.into(),
            user_id: None,
            user_name: None,
            user_role: None,
            user_title: None,
            group_id: None,
            group_name: None,
            message_id: None,
        }
    }
}

/// A topic extracted by the topic tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub session_id: SessionId,
    pub title: String,
    pub keywords: Vec<String>,
    pub summary: String,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A learned speaking habit for a specific user in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub id: i64,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub user_name: String,
    pub situation: String,
    pub style: String,
    pub example: String,
    pub created_at: DateTime<Utc>,
}

/// A sticker registration drawn from a closed emotion taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoji {
    pub id: i64,
    pub file_name: String,
    pub description: String,
    pub emotion: Emotion,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
}
