//! Transient dispatcher-owned state: the in-flight guard, the follow-up
//! window map, and the per-group poke cooldown.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use groupmind_core::types::{GroupId, SessionId, UserId};

/// At-most-one-`process_chat`-in-flight-per-session-id enforcement. A
/// guard is "held" for as long as the returned
/// [`InFlightTicket`] is alive; dropping it (including on early return or
/// panic) releases the slot.
pub struct InFlightGuard {
    active: DashMap<SessionId, ()>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self { active: DashMap::new() }
    }

    /// Attempt to enter. Returns `None` if the session is already in
    /// flight — the caller must drop the event rather than queue it.
    pub fn try_enter(&self, session_id: &SessionId) -> Option<InFlightTicket<'_>> {
        if self.active.insert(session_id.clone(), ()).is_some() {
            // Already occupied: put back the existing marker and refuse.
            return None;
        }
        Some(InFlightTicket {
            guard: self,
            session_id: session_id.clone(),
        })
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases its session slot on drop, including on early `return`.
pub struct InFlightTicket<'a> {
    guard: &'a InFlightGuard,
    session_id: SessionId,
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.guard.active.remove(&self.session_id);
    }
}

/// `(group_id, user_id) -> last_reply_time`, consulted to widen the
/// trigger rule to a short follow-up window after the bot last replied.
pub struct FollowUpMap {
    recent_replies: DashMap<(GroupId, UserId), DateTime<Utc>>,
}

impl FollowUpMap {
    pub fn new() -> Self {
        Self { recent_replies: DashMap::new() }
    }

    pub fn record(&self, group_id: GroupId, user_id: UserId) {
        self.recent_replies.insert((group_id, user_id), Utc::now());
    }

    /// Consume (remove) the record if present and still within `window_ms`.
    pub fn consume_if_recent(&self, group_id: GroupId, user_id: UserId, window_ms: i64) -> bool {
        let Some((_, last)) = self.recent_replies.remove(&(group_id, user_id)) else {
            return false;
        };
        Utc::now().signed_duration_since(last).num_milliseconds() < window_ms
    }
}

impl Default for FollowUpMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-group poke cooldown.
pub struct PokeCooldown {
    last_poke: DashMap<GroupId, DateTime<Utc>>,
}

impl PokeCooldown {
    pub fn new() -> Self {
        Self { last_poke: DashMap::new() }
    }

    /// `true` and records `now` if the group is outside its cooldown;
    /// `false` (no state change) if a poke was handled too recently.
    pub fn try_enter(&self, group_id: GroupId, cooldown_ms: i64) -> bool {
        let now = Utc::now();
        let mut entry = self.last_poke.entry(group_id).or_insert(now - chrono::Duration::milliseconds(cooldown_ms + 1));
        if now.signed_duration_since(*entry).num_milliseconds() < cooldown_ms {
            return false;
        }
        *entry = now;
        true
    }
}

impl Default for PokeCooldown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_guard_denies_concurrent_entry() {
        let guard = InFlightGuard::new();
        let id = SessionId::group(1);
        let ticket = guard.try_enter(&id);
        assert!(ticket.is_some());
        assert!(guard.try_enter(&id).is_none());
    }

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let guard = InFlightGuard::new();
        let id = SessionId::group(1);
        {
            let _ticket = guard.try_enter(&id).unwrap();
        }
        assert!(guard.try_enter(&id).is_some());
    }

    #[test]
    fn follow_up_map_consumes_record_once() {
        let map = FollowUpMap::new();
        map.record(100, 42);
        assert!(map.consume_if_recent(100, 42, 60_000));
        assert!(!map.consume_if_recent(100, 42, 60_000));
    }

    #[test]
    fn poke_cooldown_denies_within_window() {
        let cooldown = PokeCooldown::new();
        assert!(cooldown.try_enter(100, 10_000));
        assert!(!cooldown.try_enter(100, 10_000));
    }
}
