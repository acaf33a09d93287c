//! Trigger detection for inbound group messages.

use groupmind_botapi::Segment;
use groupmind_core::types::UserId;

/// Why a given inbound message is being routed into `process_chat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `@bot` segment or a configured nickname appeared in the text.
    Direct,
    /// A `reply(message_id)` segment whose referenced message was sent by
    /// the bot. Routed through the Action Planner before replying.
    QuoteOfBot,
    /// No direct signal, but a recent reply to this (group, user) pair is
    /// still inside the follow-up window.
    FollowUp,
}

/// `@bot_uin` or a configured nickname (case-insensitive) appears in the
/// message.
pub fn is_direct_mention(segments: &[Segment], raw_text: &str, bot_uin: UserId, nicknames: &[String]) -> bool {
    let at_bot = segments.iter().any(|s| matches!(s, Segment::At(uid) if *uid == bot_uin));
    if at_bot {
        return true;
    }
    let lowered = raw_text.to_lowercase();
    nicknames.iter().any(|n| !n.is_empty() && lowered.contains(&n.to_lowercase()))
}

/// `true` if `segments` contains a `reply(message_id)` whose referenced
/// sender is the bot itself.
pub fn quotes_bot(replied_sender: Option<UserId>, bot_uin: UserId) -> bool {
    replied_sender == Some(bot_uin)
}
