//! Adapts `groupmind_core::config`'s layered config structs to the
//! standalone config types each humanizer module actually takes. Kept
//! separate from `groupmind-core` so that crate doesn't need to depend on
//! every humanizer submodule just to shape its config.

use groupmind_humanizer::frequency::FrequencyConfig as RuntimeFrequencyConfig;
use groupmind_humanizer::TypoConfig as RuntimeTypoConfig;

/// `groupmind_core::config::FrequencyConfig` collapses quiet hours into
/// two plain `u8` fields; the controller wants them as one optional tuple
/// (disabled entirely would be expressed by the caller not gating on
/// quiet hours, which this config schema doesn't support, so the tuple is
/// always `Some`).
pub fn frequency_config(cfg: &groupmind_core::config::FrequencyConfig) -> RuntimeFrequencyConfig {
    RuntimeFrequencyConfig {
        enabled: cfg.enabled,
        speak_probability: cfg.speak_probability,
        min_interval_ms: cfg.min_interval_ms as i64,
        max_interval_ms: cfg.max_interval_ms,
        quiet_hours: Some((cfg.quiet_hours_start as u32, cfg.quiet_hours_end as u32)),
        quiet_multiplier: cfg.quiet_probability_multiplier,
    }
}

/// Both `TypoConfig`s have identical field shapes; this only exists so
/// the typo module doesn't have to take a dependency on `groupmind-core`
/// for a type it renders stateless and pure.
pub fn typo_config(cfg: &groupmind_core::config::TypoConfig) -> RuntimeTypoConfig {
    RuntimeTypoConfig {
        enabled: cfg.enabled,
        error_rate: cfg.error_rate,
        word_replace_rate: cfg.word_replace_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_quiet_hours_into_a_tuple() {
        let core_cfg = groupmind_core::config::FrequencyConfig {
            enabled: true,
            min_interval_ms: 60_000,
            max_interval_ms: 15_000,
            speak_probability: 0.1,
            quiet_hours_start: 23,
            quiet_hours_end: 7,
            quiet_probability_multiplier: 0.2,
        };
        let runtime_cfg = frequency_config(&core_cfg);
        assert_eq!(runtime_cfg.quiet_hours, Some((23, 7)));
        assert_eq!(runtime_cfg.min_interval_ms, 60_000);
    }
}
