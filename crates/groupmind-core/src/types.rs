//! Shared identifiers and small closed-taxonomy types used across every
//! `groupmind-*` crate. Kept dependency-free (beyond serde) so nothing else
//! in the workspace needs to depend on a "heavier" crate just to name a role
//! or format a session key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platform-native group chat identifier (OneBot-style 64-bit int).
pub type GroupId = i64;
/// Platform-native user identifier.
pub type UserId = i64;
/// Platform-native message identifier, used for quote/reply.
pub type MessageId = i64;

/// Which kind of conversation a [`SessionId`] addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Group,
    Personal,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Group => write!(f, "group"),
            SessionType::Personal => write!(f, "personal"),
        }
    }
}

/// Session identity key: `group:{gid}` or `personal:{uid}`.
///
/// Deliberately a thin wrapper over `String` rather than an enum so it can be
/// used directly as a SQL primary key without a round trip through `format!`
/// at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn group(gid: GroupId) -> Self {
        Self(format!("group:{gid}"))
    }

    pub fn personal(uid: UserId) -> Self {
        Self(format!("personal:{uid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into `(SessionType, target_id)`. Returns `None` if the key
    /// doesn't match the `kind:id` shape this type itself produces.
    pub fn parse(&self) -> Option<(SessionType, i64)> {
        let (kind, id) = self.0.split_once(':')?;
        let id: i64 = id.parse().ok()?;
        match kind {
            "group" => Some((SessionType::Group, id)),
            "personal" => Some((SessionType::Personal, id)),
            _ => None,
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group member's role, as reported by the bot gateway's member-info call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
    Owner,
}

impl MemberRole {
    pub fn is_admin_or_owner(&self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Owner)
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, MemberRole::Owner)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Owner => write!(f, "owner"),
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::Member => write!(f, "member"),
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            other => Err(format!("unknown member role: {other}")),
        }
    }
}

/// A persisted message's author role ( `Message.role`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "system" => Ok(MessageRole::System),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

/// Closed sticker-emotion taxonomy ( `Emoji.emotion`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Disgusted,
    Scared,
    Neutral,
    Funny,
    Cute,
    Confused,
    Excited,
    Tired,
    Love,
}

impl Emotion {
    pub const ALL: [Emotion; 13] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Disgusted,
        Emotion::Scared,
        Emotion::Neutral,
        Emotion::Funny,
        Emotion::Cute,
        Emotion::Confused,
        Emotion::Excited,
        Emotion::Tired,
        Emotion::Love,
    ];
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Disgusted => "disgusted",
            Emotion::Scared => "scared",
            Emotion::Neutral => "neutral",
            Emotion::Funny => "funny",
            Emotion::Cute => "cute",
            Emotion::Confused => "confused",
            Emotion::Excited => "excited",
            Emotion::Tired => "tired",
            Emotion::Love => "love",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "angry" => Ok(Emotion::Angry),
            "surprised" => Ok(Emotion::Surprised),
            "disgusted" => Ok(Emotion::Disgusted),
            "scared" => Ok(Emotion::Scared),
            "neutral" => Ok(Emotion::Neutral),
            "funny" => Ok(Emotion::Funny),
            "cute" => Ok(Emotion::Cute),
            "confused" => Ok(Emotion::Confused),
            "excited" => Ok(Emotion::Excited),
            "tired" => Ok(Emotion::Tired),
            "love" => Ok(Emotion::Love),
            other => Err(format!("unknown emotion: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_round_trips() {
        let s = SessionId::group(100);
        assert_eq!(s.as_str(), "group:100");
        assert_eq!(s.parse(), Some((SessionType::Group, 100)));

        let p = SessionId::personal(42);
        assert_eq!(p.parse(), Some((SessionType::Personal, 42)));
    }

    #[test]
    fn session_id_parse_rejects_garbage() {
        let bad = SessionId("not-a-session".to_string());
        assert_eq!(bad.parse(), None);
    }

    #[test]
    fn emotion_falls_back_on_unparseable_label() {
        assert!("sideways".parse::<Emotion>().is_err());
        // caller-side fallback to Neutral is exercised in groupmind-humanizer
    }

    #[test]
    fn member_role_ordering_places_owner_above_admin() {
        assert!(MemberRole::Owner > MemberRole::Admin);
        assert!(MemberRole::Admin > MemberRole::Member);
    }
}
