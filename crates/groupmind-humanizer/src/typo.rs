//! Typo Generator — a pure text transform that roughens an outgoing line so
//! it reads less like a perfectly composed message.

use std::sync::LazyLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

pub struct TypoConfig {
    pub enabled: bool,
    pub error_rate: f64,
    pub word_replace_rate: f64,
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            error_rate: 0.03,
            word_replace_rate: 0.10,
        }
    }
}

struct PhraseRule {
    pattern: Regex,
    replacement: &'static str,
}

/// Ordered casual-phrase replacements. First match wins.
static PHRASE_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    let rules: &[(&str, &str)] = &[
        (r"\bI am\b", "I'm"),
        (r"\byou are\b", "you're"),
        (r"\bgoing to\b", "gonna"),
        (r"\bwant to\b", "wanna"),
        (r"\bkind of\b", "kinda"),
        (r"没有\b", "没"),
        (r"什么\b", "啥"),
    ];
    rules
        .iter()
        .map(|(pattern, replacement)| PhraseRule {
            pattern: Regex::new(pattern).expect("static typo phrase pattern is valid"),
            replacement,
        })
        .collect()
});

/// Homophone table for single CJK characters, used by the per-codepoint
/// error pass.
static HOMOPHONES: LazyLock<std::collections::HashMap<char, Vec<char>>> = LazyLock::new(|| {
    let mut map = std::collections::HashMap::new();
    map.insert('的', vec!['地', '得']);
    map.insert('在', vec!['再']);
    map.insert('他', vec!['她', '它']);
    map.insert('是', vec!['事']);
    map.insert('有', vec!['又']);
    map.insert('到', vec!['道']);
    map.insert('做', vec!['作']);
    map
});

/// Apply the casual-phrase and homophone-error passes to a single line.
/// Identity function when disabled.
pub fn apply(cfg: &TypoConfig, text: &str) -> String {
    if !cfg.enabled {
        return text.to_string();
    }

    let mut rng = rand::thread_rng();
    let mut text = text.to_string();

    if rng.gen_bool(cfg.word_replace_rate.clamp(0.0, 1.0)) {
        for rule in PHRASE_RULES.iter() {
            if rule.pattern.is_match(&text) {
                text = rule.pattern.replace(&text, rule.replacement).to_string();
                break;
            }
        }
    }

    text.chars()
        .map(|c| {
            if rng.gen_bool(cfg.error_rate.clamp(0.0, 1.0)) {
                if let Some(options) = HOMOPHONES.get(&c) {
                    return *options.choose(&mut rng).unwrap_or(&c);
                }
            }
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_identity() {
        let cfg = TypoConfig {
            enabled: false,
            ..TypoConfig::default()
        };
        assert_eq!(apply(&cfg, "I am going to test this"), "I am going to test this");
    }

    #[test]
    fn zero_rates_leave_text_unchanged() {
        let cfg = TypoConfig {
            enabled: true,
            error_rate: 0.0,
            word_replace_rate: 0.0,
        };
        assert_eq!(apply(&cfg, "这是一个测试"), "这是一个测试");
    }

    #[test]
    fn guaranteed_phrase_replacement_applies_first_match() {
        let cfg = TypoConfig {
            enabled: true,
            error_rate: 0.0,
            word_replace_rate: 1.0,
        };
        let out = apply(&cfg, "I am going to do this");
        assert_eq!(out, "I'm going to do this");
    }
}
