//! Layered configuration.
//!
//! Loaded as a TOML file merged with environment overrides via `figment`.
//! Every leaf has a sensible default so a near-empty config file is valid.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Top-level config for one agent persona (`groupmind.toml` + `GROUPMIND_*` env).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Override model used for cheap/background calls (planner, topic tracker).
    /// Falls back to `model` when unset.
    pub working_model: Option<String>,
    #[serde(default)]
    pub is_multimodal: bool,
    #[serde(default)]
    pub nicknames: Vec<String>,
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Max context window, in thousands of tokens.
    #[serde(default = "default_max_context_tokens_k")]
    pub max_context_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_history_count")]
    pub history_count: u32,
    #[serde(default)]
    pub blacklist_groups: Vec<i64>,
    #[serde(default)]
    pub whitelist_groups: Vec<i64>,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// `-1` means "unbounded" (still capped internally, see groupmind-engine).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: i64,
    #[serde(default)]
    pub enable_group_admin: bool,
    #[serde(default)]
    pub enable_external_skills: bool,
    /// Recipients of `report_abuse` DMs; not part of the key list,
    /// added since the tool needs somewhere to send reports.
    #[serde(default)]
    pub bot_owners: Vec<i64>,

    #[serde(default)]
    pub personality: PersonalityConfig,
    #[serde(default)]
    pub reply_style: ReplyStyleConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub topic: TopicConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub frequency: FrequencyConfig,
    #[serde(default)]
    pub typo: TypoConfig,
    #[serde(default)]
    pub emoji: EmojiConfig,
    #[serde(default)]
    pub expression: ExpressionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityConfig {
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default = "default_state_probability")]
    pub state_probability: f64,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            state_probability: default_state_probability(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyStyleConfig {
    #[serde(default = "default_base_style")]
    pub base_style: String,
    #[serde(default)]
    pub multiple_styles: Vec<String>,
    #[serde(default = "default_multiple_probability")]
    pub multiple_probability: f64,
}

impl Default for ReplyStyleConfig {
    fn default() -> Self {
        Self {
            base_style: default_base_style(),
            multiple_styles: Vec::new(),
            multiple_probability: default_multiple_probability(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_memory_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_memory_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_iterations: default_memory_max_iterations(),
            timeout_ms: default_memory_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_topic_message_threshold")]
    pub message_threshold: u32,
    #[serde(default = "default_topic_time_threshold_ms")]
    pub time_threshold_ms: u64,
    #[serde(default = "default_max_topics_per_session")]
    pub max_topics_per_session: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            message_threshold: default_topic_message_threshold(),
            time_threshold_ms: default_topic_time_threshold_ms(),
            max_topics_per_session: default_max_topics_per_session(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    #[serde(default = "default_speak_probability")]
    pub speak_probability: f64,
    #[serde(default = "default_quiet_hours_start")]
    pub quiet_hours_start: u8,
    #[serde(default = "default_quiet_hours_end")]
    pub quiet_hours_end: u8,
    #[serde(default = "default_quiet_probability_multiplier")]
    pub quiet_probability_multiplier: f64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            speak_probability: default_speak_probability(),
            quiet_hours_start: default_quiet_hours_start(),
            quiet_hours_end: default_quiet_hours_end(),
            quiet_probability_multiplier: default_quiet_probability_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypoConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_typo_error_rate")]
    pub error_rate: f64,
    #[serde(default = "default_typo_word_replace_rate")]
    pub word_replace_rate: f64,
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            error_rate: default_typo_error_rate(),
            word_replace_rate: default_typo_word_replace_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_emoji_dir")]
    pub emoji_dir: String,
    #[serde(default = "default_emoji_send_probability")]
    pub send_probability: f64,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            emoji_dir: default_emoji_dir(),
            send_probability: default_emoji_send_probability(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_max_expressions")]
    pub max_expressions: usize,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_expressions: default_max_expressions(),
            sample_size: default_sample_size(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_persona() -> String {
    "a friendly group member".to_string()
}
fn default_max_context_tokens_k() -> u32 {
    128
}
fn default_temperature() -> f64 {
    0.8
}
fn default_history_count() -> u32 {
    100
}
fn default_max_sessions() -> usize {
    100
}
fn default_max_iterations() -> i64 {
    20
}
fn default_state_probability() -> f64 {
    0.15
}
fn default_base_style() -> String {
    "casual".to_string()
}
fn default_multiple_probability() -> f64 {
    0.0
}
fn default_memory_max_iterations() -> u32 {
    3
}
fn default_memory_timeout_ms() -> u64 {
    15_000
}
fn default_topic_message_threshold() -> u32 {
    20
}
fn default_topic_time_threshold_ms() -> u64 {
    30 * 60 * 1000
}
fn default_max_topics_per_session() -> usize {
    20
}
fn default_min_interval_ms() -> u64 {
    60_000
}
fn default_max_interval_ms() -> u64 {
    3_000
}
fn default_speak_probability() -> f64 {
    0.3
}
fn default_quiet_hours_start() -> u8 {
    23
}
fn default_quiet_hours_end() -> u8 {
    7
}
fn default_quiet_probability_multiplier() -> f64 {
    0.2
}
fn default_typo_error_rate() -> f64 {
    0.03
}
fn default_typo_word_replace_rate() -> f64 {
    0.10
}
fn default_emoji_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.groupmind/emojis")
}
fn default_emoji_send_probability() -> f64 {
    0.2
}
fn default_max_expressions() -> usize {
    100
}
fn default_sample_size() -> usize {
    8
}

impl Default for Config {
    /// Defaults matching every `#[serde(default = ...)]` leaf above. Useful
    /// for tests that only care about a handful of fields; real deployments
    /// always go through [`Config::load`] since `api_key` has no default.
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            model: default_model(),
            working_model: None,
            is_multimodal: false,
            nicknames: Vec::new(),
            persona: default_persona(),
            max_context_tokens: default_max_context_tokens_k(),
            temperature: default_temperature(),
            history_count: default_history_count(),
            blacklist_groups: Vec::new(),
            whitelist_groups: Vec::new(),
            max_sessions: default_max_sessions(),
            max_iterations: default_max_iterations(),
            enable_group_admin: false,
            enable_external_skills: false,
            bot_owners: Vec::new(),
            personality: PersonalityConfig::default(),
            reply_style: ReplyStyleConfig::default(),
            memory: MemoryConfig::default(),
            topic: TopicConfig::default(),
            planner: PlannerConfig::default(),
            frequency: FrequencyConfig::default(),
            typo: TypoConfig::default(),
            emoji: EmojiConfig::default(),
            expression: ExpressionConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path` (defaults to `~/.groupmind/groupmind.toml`), with
    /// `GROUPMIND_*` environment overrides layered on top.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.map(String::from).unwrap_or_else(default_config_path);

        let config: Config = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GROUPMIND_").split("_"))
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        if config.api_key.trim().is_empty() {
            return Err(CoreError::MissingApiKey);
        }

        Ok(config)
    }

    /// Model used for cheap background analyzer calls — falls back to the
    /// primary model when no `working_model` override is configured.
    pub fn working_model(&self) -> &str {
        self.working_model.as_deref().unwrap_or(&self.model)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.groupmind/groupmind.toml")
}

/// A layered key/value config source with change notifications — interface
/// only. A live, file-watching implementation is the plugin host's
/// responsibility.
pub trait ConfigStore: Send + Sync {
    fn current(&self) -> Config;
    fn subscribe(&self) -> tokio::sync::watch::Receiver<Config>;
}

/// Reference implementation: one config, loaded once, never changes.
/// Suitable for tests and for hosts that don't support hot reload.
pub struct StaticConfigStore {
    tx: tokio::sync::watch::Sender<Config>,
}

impl StaticConfigStore {
    pub fn new(config: Config) -> Self {
        let (tx, _rx) = tokio::sync::watch::channel(config);
        Self { tx }
    }
}

impl ConfigStore for StaticConfigStore {
    fn current(&self) -> Config {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> tokio::sync::watch::Receiver<Config> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config {
            api_url: "https://example.invalid".to_string(),
            api_key: "key".to_string(),
            model: default_model(),
            working_model: None,
            is_multimodal: false,
            nicknames: vec!["miku".to_string()],
            persona: default_persona(),
            max_context_tokens: default_max_context_tokens_k(),
            temperature: default_temperature(),
            history_count: default_history_count(),
            blacklist_groups: Vec::new(),
            whitelist_groups: Vec::new(),
            max_sessions: default_max_sessions(),
            max_iterations: default_max_iterations(),
            enable_group_admin: false,
            enable_external_skills: false,
            bot_owners: Vec::new(),
            personality: PersonalityConfig::default(),
            reply_style: ReplyStyleConfig::default(),
            memory: MemoryConfig::default(),
            topic: TopicConfig::default(),
            planner: PlannerConfig::default(),
            frequency: FrequencyConfig::default(),
            typo: TypoConfig::default(),
            emoji: EmojiConfig::default(),
            expression: ExpressionConfig::default(),
        }
    }

    #[test]
    fn working_model_falls_back_to_primary() {
        let cfg = minimal_config();
        assert_eq!(cfg.working_model(), cfg.model);
    }

    #[test]
    fn working_model_override_takes_priority() {
        let mut cfg = minimal_config();
        cfg.working_model = Some("small-model".to_string());
        assert_eq!(cfg.working_model(), "small-model");
    }

    #[test]
    fn static_config_store_reports_loaded_config() {
        let cfg = minimal_config();
        let store = StaticConfigStore::new(cfg.clone());
        assert_eq!(store.current().api_key, cfg.api_key);
        let rx = store.subscribe();
        assert_eq!(rx.borrow().model, cfg.model);
    }
}
