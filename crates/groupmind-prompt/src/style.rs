//! Stochastic personality/reply-style pickers.
//!
//! These are the only randomness in the prompt-building pipeline; keeping
//! them in their own module (rather than inside [`crate::render`]) is what
//! lets `render` stay a pure function over an already-decided
//! [`crate::types::PromptContext`].

use groupmind_core::config::{PersonalityConfig, ReplyStyleConfig};
use rand::Rng;

/// With `cfg.state_probability`, pick a uniform state from `cfg.states`;
/// otherwise (or if the list is empty) return `None`.
pub fn pick_personality_state(cfg: &PersonalityConfig) -> Option<String> {
    if cfg.states.is_empty() {
        return None;
    }
    let mut rng = rand::thread_rng();
    if rng.gen_bool(cfg.state_probability.clamp(0.0, 1.0)) {
        let idx = rng.gen_range(0..cfg.states.len());
        Some(cfg.states[idx].clone())
    } else {
        None
    }
}

/// With `cfg.multiple_probability`, pick a uniform style from
/// `cfg.multiple_styles`; otherwise fall back to `cfg.base_style`. Falls back
/// to `base_style` as well if `multiple_styles` is empty.
pub fn pick_reply_style(cfg: &ReplyStyleConfig) -> String {
    if cfg.multiple_styles.is_empty() {
        return cfg.base_style.clone();
    }
    let mut rng = rand::thread_rng();
    if rng.gen_bool(cfg.multiple_probability.clamp(0.0, 1.0)) {
        let idx = rng.gen_range(0..cfg.multiple_styles.len());
        cfg.multiple_styles[idx].clone()
    } else {
        cfg.base_style.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personality_state_none_when_list_empty() {
        let cfg = PersonalityConfig {
            states: vec![],
            state_probability: 1.0,
        };
        assert_eq!(pick_personality_state(&cfg), None);
    }

    #[test]
    fn personality_state_always_picked_when_probability_one() {
        let cfg = PersonalityConfig {
            states: vec!["sleepy".into(), "hyper".into()],
            state_probability: 1.0,
        };
        let state = pick_personality_state(&cfg).unwrap();
        assert!(cfg.states.contains(&state));
    }

    #[test]
    fn personality_state_never_picked_when_probability_zero() {
        let cfg = PersonalityConfig {
            states: vec!["sleepy".into()],
            state_probability: 0.0,
        };
        assert_eq!(pick_personality_state(&cfg), None);
    }

    #[test]
    fn reply_style_falls_back_to_base_when_empty() {
        let cfg = ReplyStyleConfig {
            base_style: "neutral".into(),
            multiple_styles: vec![],
            multiple_probability: 1.0,
        };
        assert_eq!(pick_reply_style(&cfg), "neutral");
    }

    #[test]
    fn reply_style_picks_from_multiple_when_probability_one() {
        let cfg = ReplyStyleConfig {
            base_style: "neutral".into(),
            multiple_styles: vec!["blunt".into(), "playful".into()],
            multiple_probability: 1.0,
        };
        let style = pick_reply_style(&cfg);
        assert!(cfg.multiple_styles.contains(&style));
    }
}
