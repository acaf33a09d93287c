//! Frequency Controller — decides whether the bot should volunteer a reply
//! outside of a direct trigger, and paces typing delay.

use chrono::{DateTime, Timelike, Utc};
use dashmap::DashMap;
use rand::Rng;

use groupmind_core::types::SessionId;

const CONSECUTIVE_NO_REPLY_FLOOR: u32 = 2;
const CONSECUTIVE_NO_REPLY_STEP: f64 = 0.2;

pub struct FrequencyConfig {
    pub enabled: bool,
    pub speak_probability: f64,
    pub min_interval_ms: i64,
    pub max_interval_ms: u64,
    pub quiet_hours: Option<(u32, u32)>,
    pub quiet_multiplier: f64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speak_probability: 0.1,
            min_interval_ms: 60_000,
            max_interval_ms: 15_000,
            quiet_hours: Some((23, 7)),
            quiet_multiplier: 0.2,
        }
    }
}

#[derive(Default)]
struct SessionState {
    last_speak: Option<DateTime<Utc>>,
    consecutive_no_reply: u32,
}

/// Gates volunteered (non-triggered) replies and tracks typing pacing.
pub struct FrequencyController {
    cfg: FrequencyConfig,
    state: DashMap<SessionId, SessionState>,
}

impl FrequencyController {
    pub fn new(cfg: FrequencyConfig) -> Self {
        Self {
            cfg,
            state: DashMap::new(),
        }
    }

    /// Decide whether the bot should speak now, absent a direct trigger.
    pub fn should_speak(&self, session_id: &SessionId) -> bool {
        if !self.cfg.enabled {
            return true;
        }

        let now = Utc::now();
        let mut entry = self.state.entry(session_id.clone()).or_default();

        if let Some(last) = entry.last_speak {
            if now.signed_duration_since(last).num_milliseconds() < self.cfg.min_interval_ms {
                return false;
            }
        }

        let mut probability = self.cfg.speak_probability;
        if let Some((start, end)) = self.cfg.quiet_hours {
            if in_quiet_hours(now.hour(), start, end) {
                probability *= self.cfg.quiet_multiplier;
            }
        }
        if entry.consecutive_no_reply >= 3 {
            let bonus = CONSECUTIVE_NO_REPLY_STEP * (entry.consecutive_no_reply - CONSECUTIVE_NO_REPLY_FLOOR) as f64;
            probability = (probability + bonus).min(1.0);
        }

        let roll: f64 = rand::thread_rng().gen_range(0.0..1.0);
        if roll < probability {
            true
        } else {
            entry.consecutive_no_reply += 1;
            false
        }
    }

    /// Record that the bot spoke, resetting the no-reply streak.
    pub fn record_speak(&self, session_id: &SessionId) {
        let mut entry = self.state.entry(session_id.clone()).or_default();
        entry.last_speak = Some(Utc::now());
        entry.consecutive_no_reply = 0;
    }

    /// Simulated typing delay for a reply of `char_len` characters.
    pub fn typing_delay(&self, char_len: usize) -> std::time::Duration {
        let base = rand::thread_rng().gen_range(1000..=3000) as u64;
        let per_char = rand::thread_rng().gen_range(50..=100) as u64;
        let total = base + char_len as u64 * per_char;
        std::time::Duration::from_millis(total.min(self.cfg.max_interval_ms))
    }
}

/// Hour-of-day wraparound check, e.g. quiet from 23 to 7.
fn in_quiet_hours(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_speak_always_true_when_disabled() {
        let ctrl = FrequencyController::new(FrequencyConfig {
            enabled: false,
            ..FrequencyConfig::default()
        });
        let id = SessionId::group(1);
        assert!(ctrl.should_speak(&id));
    }

    #[test]
    fn should_speak_denies_within_min_interval() {
        let ctrl = FrequencyController::new(FrequencyConfig {
            speak_probability: 1.0,
            min_interval_ms: 60_000,
            ..FrequencyConfig::default()
        });
        let id = SessionId::group(1);
        ctrl.record_speak(&id);
        assert!(!ctrl.should_speak(&id));
    }

    #[test]
    fn record_speak_resets_no_reply_streak() {
        let ctrl = FrequencyController::new(FrequencyConfig::default());
        let id = SessionId::group(1);
        for _ in 0..5 {
            ctrl.state.entry(id.clone()).or_default().consecutive_no_reply += 1;
        }
        ctrl.record_speak(&id);
        assert_eq!(ctrl.state.get(&id).unwrap().consecutive_no_reply, 0);
    }

    #[test]
    fn in_quiet_hours_handles_wraparound() {
        assert!(in_quiet_hours(23, 23, 7));
        assert!(in_quiet_hours(3, 23, 7));
        assert!(!in_quiet_hours(12, 23, 7));
    }

    #[test]
    fn typing_delay_is_capped_at_max_interval() {
        let ctrl = FrequencyController::new(FrequencyConfig {
            max_interval_ms: 2000,
            ..FrequencyConfig::default()
        });
        let delay = ctrl.typing_delay(10_000);
        assert!(delay.as_millis() <= 2000);
    }
}
