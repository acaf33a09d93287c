use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info};

use groupmind_core::types::{GroupId, UserId};

/// How often the background sweep prunes expired entries.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub group_cooldown_ms: i64,
    pub max_triggers_per_window: usize,
    pub window_ms: i64,
    pub dedup_window_ms: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            group_cooldown_ms: 3_000,
            max_triggers_per_window: 10,
            window_ms: 60_000,
            dedup_window_ms: 30_000,
        }
    }
}

struct DedupEntry {
    content: String,
    at: DateTime<Utc>,
}

/// Three independent checks combined as a conjunction:
/// per-group cooldown, per-user sliding window, and exact-content
/// deduplication. All three share the same concurrent maps so `record`
/// only needs one lock-free pass per map.
pub struct RateLimiter {
    cfg: RateLimitConfig,
    group_last: DashMap<GroupId, DateTime<Utc>>,
    user_window: DashMap<UserId, VecDeque<DateTime<Utc>>>,
    user_dedup: DashMap<UserId, DedupEntry>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimitConfig) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            group_last: DashMap::new(),
            user_window: DashMap::new(),
            user_dedup: DashMap::new(),
        })
    }

    /// Returns `true` if the trigger is allowed to proceed.
    pub fn check(&self, user_id: UserId, group_id: GroupId, content: &str) -> bool {
        self.group_cooldown_ok(group_id) && self.user_window_ok(user_id) && self.dedup_ok(user_id, content)
    }

    fn group_cooldown_ok(&self, group_id: GroupId) -> bool {
        match self.group_last.get(&group_id) {
            Some(last) => {
                let elapsed = Utc::now().signed_duration_since(*last).num_milliseconds();
                elapsed >= self.cfg.group_cooldown_ms
            }
            None => true,
        }
    }

    fn user_window_ok(&self, user_id: UserId) -> bool {
        match self.user_window.get(&user_id) {
            Some(window) => {
                let cutoff = Utc::now() - chrono::Duration::milliseconds(self.cfg.window_ms);
                let count = window.iter().filter(|t| **t >= cutoff).count();
                count < self.cfg.max_triggers_per_window
            }
            None => true,
        }
    }

    fn dedup_ok(&self, user_id: UserId, content: &str) -> bool {
        match self.user_dedup.get(&user_id) {
            Some(entry) => {
                let elapsed = Utc::now().signed_duration_since(entry.at).num_milliseconds();
                !(entry.content == content && elapsed < self.cfg.dedup_window_ms)
            }
            None => true,
        }
    }

    /// Updates all three tracked maps. Called by the dispatcher after a
    /// trigger passes `check`.
    pub fn record(&self, user_id: UserId, group_id: GroupId, content: &str) {
        let now = Utc::now();
        self.group_last.insert(group_id, now);

        let mut window = self.user_window.entry(user_id).or_default();
        window.push_back(now);
        let cutoff = now - chrono::Duration::milliseconds(self.cfg.window_ms);
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }
        drop(window);

        self.user_dedup.insert(
            user_id,
            DedupEntry {
                content: content.to_string(),
                at: now,
            },
        );
    }

    /// Drop entries that can no longer affect any future decision.
    fn cleanup(&self) {
        let now = Utc::now();
        self.group_last
            .retain(|_, last| now.signed_duration_since(*last).num_milliseconds() < self.cfg.group_cooldown_ms);
        self.user_dedup.retain(|_, entry| {
            now.signed_duration_since(entry.at).num_milliseconds() < self.cfg.dedup_window_ms
        });
        self.user_window.retain(|_, window| {
            let cutoff = now - chrono::Duration::milliseconds(self.cfg.window_ms);
            window.retain(|t| *t >= cutoff);
            !window.is_empty()
        });
        debug!("rate limiter cleanup pass complete");
    }

    /// Spawn the periodic sweep. Exits when `shutdown` reports `true`.
    pub fn spawn_cleanup(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => limiter.cleanup(),
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("rate limiter cleanup loop shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> Arc<RateLimiter> {
        RateLimiter::new(RateLimitConfig {
            group_cooldown_ms: 1_000,
            max_triggers_per_window: 2,
            window_ms: 10_000,
            dedup_window_ms: 2_000,
        })
    }

    #[test]
    fn first_trigger_always_allowed() {
        let rl = limiter();
        assert!(rl.check(1, 100, "hello"));
    }

    #[test]
    fn group_cooldown_denies_immediate_repeat() {
        let rl = limiter();
        rl.record(1, 100, "hello");
        assert!(!rl.check(2, 100, "different content"));
    }

    #[test]
    fn user_sliding_window_denies_after_cap() {
        let rl = limiter();
        rl.record(1, 100, "a");
        rl.record(1, 200, "b");
        // third trigger from the same user within the window exceeds the cap
        assert!(!rl.check(1, 300, "c"));
    }

    #[test]
    fn dedup_denies_exact_repeat_content() {
        let rl = limiter();
        rl.record(1, 100, "same text");
        assert!(!rl.check(1, 999, "same text"));
    }

    #[test]
    fn dedup_allows_distinct_content() {
        let rl = limiter();
        rl.record(1, 100, "same text");
        assert!(rl.check(1, 999, "distinct text"));
    }
}
