//! Emoji System — maintains a sticker library and picks a reaction image
//! for an outgoing reply.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::LazyLock;

use base64::Engine;
use rand::Rng;
use tracing::warn;

pub use groupmind_core::config::EmojiConfig;
use groupmind_core::types::Emotion;
use groupmind_llm::{ChatMessage, CompletionRequest, ContentPart, LlmClient, MultimodalMessage, MultimodalRequest, Role};
use groupmind_store::Store;

const REGISTERED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const FETCH_LIMIT: usize = 5;
const FALLBACK_LIMIT: usize = 3;

/// Small keyword cue list for the quick classifier. Checked before paying
/// for an LLM call.
static KEYWORD_CUES: LazyLock<Vec<(Emotion, &'static [&'static str])>> = LazyLock::new(|| {
    vec![
        (Emotion::Happy, &["haha", "lol", "开心", "哈哈"]),
        (Emotion::Sad, &["sad", "sorry", "难过", "呜呜"]),
        (Emotion::Angry, &["angry", "mad", "生气", "怒"]),
        (Emotion::Surprised, &["wow", "what", "惊讶", "天哪"]),
        (Emotion::Love, &["love", "<3", "爱", "喜欢"]),
        (Emotion::Confused, &["confused", "huh", "?", "疑惑"]),
    ]
});

pub struct EmojiSystem {
    cfg: EmojiConfig,
}

impl EmojiSystem {
    pub fn new(cfg: EmojiConfig) -> Self {
        Self { cfg }
    }

    /// Scan `emoji_dir` for sticker files not yet in the store, analyze
    /// each, and register it.
    pub async fn scan_and_register(&self, llm: &dyn LlmClient, model: &str, is_multimodal: bool, store: Arc<Store>) {
        if !self.cfg.enabled {
            return;
        }
        let dir = Path::new(&self.cfg.emoji_dir);
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        let known: std::collections::HashSet<String> = store
            .get_all_emojis()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.file_name)
            .collect();

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if known.contains(file_name) {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !REGISTERED_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                continue;
            }

            let (description, emotion) = self
                .analyze_emotion(llm, model, is_multimodal, &path, file_name)
                .await;

            if let Err(e) = store.save_emoji(file_name, &description, emotion) {
                warn!(file_name, error = %e, "failed to register emoji");
            }
        }
    }

    /// Download a remote image into `emoji_dir` and register it, mirroring
    /// a bot adapter's get-file-then-download-then-encode pipeline. Network
    /// or filesystem failures are swallowed — a missed sticker isn't worth
    /// failing the inbound message over.
    pub async fn register_incoming_url(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        is_multimodal: bool,
        store: &Store,
        url: &str,
    ) {
        if !self.cfg.enabled {
            return;
        }
        let bytes = match reqwest::get(url).await {
            Ok(resp) => match resp.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    warn!(url, error = %e, "failed to read emoji download body");
                    return;
                }
            },
            Err(e) => {
                warn!(url, error = %e, "failed to download emoji image");
                return;
            }
        };

        let ext = Path::new(url)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| REGISTERED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or("png")
            .to_string();
        let file_name = format!("{}.{ext}", uuid::Uuid::new_v4());
        let dest = Path::new(&self.cfg.emoji_dir).join(&file_name);

        if let Some(parent) = dest.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %dest.display(), error = %e, "failed to create emoji dir");
                return;
            }
        }
        if let Err(e) = std::fs::write(&dest, &bytes) {
            warn!(path = %dest.display(), error = %e, "failed to write downloaded emoji");
            return;
        }

        self.register_incoming(llm, model, is_multimodal, store, &dest).await;
    }

    /// Register an image dropped in by an inbound segment.
    pub async fn register_incoming(&self, llm: &dyn LlmClient, model: &str, is_multimodal: bool, store: &Store, path: &Path) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let (description, emotion) = self
            .analyze_emotion(llm, model, is_multimodal, path, file_name)
            .await;
        if let Err(e) = store.save_emoji(file_name, &description, emotion) {
            warn!(file_name, error = %e, "failed to register incoming emoji");
        }
    }

    async fn analyze_emotion(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        is_multimodal: bool,
        path: &Path,
        file_name: &str,
    ) -> (String, Emotion) {
        if !is_multimodal {
            return (file_name.to_string(), Emotion::Neutral);
        }

        let Ok(bytes) = std::fs::read(path) else {
            return (file_name.to_string(), Emotion::Neutral);
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let data_url = format!("data:image/png;base64,{encoded}");

        let request = MultimodalRequest {
            messages: vec![MultimodalMessage {
                role: Role::User,
                parts: vec![
                    ContentPart::Text {
                        text: "Describe this sticker and classify its emotion as JSON: \
                               {\"description\",\"emotion\"}."
                            .to_string(),
                    },
                    ContentPart::ImageUrl { image_url: data_url },
                ],
            }],
            model: model.to_string(),
            temperature: Some(0.2),
            max_tokens: Some(200),
        };

        match llm.generate_multimodal(request).await {
            Ok(text) => parse_description(&text).unwrap_or_else(|| (file_name.to_string(), Emotion::Neutral)),
            Err(e) => {
                warn!(file_name, error = %e, "emotion analysis failed, falling back to neutral");
                (file_name.to_string(), Emotion::Neutral)
            }
        }
    }

    /// With probability `send_probability`, pick an emoji matching the
    /// emotion of `reply_text`. Returns the chosen sticker's path, if any.
    pub async fn pick_emoji(&self, llm: &dyn LlmClient, model: &str, store: &Store, reply_text: &str) -> Option<PathBuf> {
        if !self.cfg.enabled {
            return None;
        }
        if rand::thread_rng().gen_bool(self.cfg.send_probability.clamp(0.0, 1.0)) {
            let emotion = self.classify_emotion(llm, model, reply_text).await;
            let mut candidates = store.get_by_emotion(emotion, FETCH_LIMIT).ok()?;
            if candidates.is_empty() {
                candidates = store.get_by_emotion(Emotion::Neutral, FALLBACK_LIMIT).ok()?;
            }
            if candidates.is_empty() {
                return None;
            }

            let max_usage = candidates.iter().map(|e| e.usage_count).max().unwrap_or(0);
            let weights: Vec<u64> = candidates.iter().map(|e| max_usage + 1 - e.usage_count + 1).collect();
            let total: u64 = weights.iter().sum();
            let mut pick = rand::thread_rng().gen_range(0..total.max(1));
            let mut chosen_idx = 0;
            for (i, w) in weights.iter().enumerate() {
                if pick < *w {
                    chosen_idx = i;
                    break;
                }
                pick -= w;
            }

            let chosen = &candidates[chosen_idx];
            let _ = store.increment_emoji_usage(chosen.id);
            return Some(Path::new(&self.cfg.emoji_dir).join(&chosen.file_name));
        }
        None
    }

    async fn classify_emotion(&self, llm: &dyn LlmClient, model: &str, reply_text: &str) -> Emotion {
        let lowered = reply_text.to_lowercase();
        for (emotion, cues) in KEYWORD_CUES.iter() {
            if cues.iter().any(|cue| lowered.contains(cue)) {
                return *emotion;
            }
        }

        let result = llm
            .complete(CompletionRequest {
                model: model.to_string(),
                messages: vec![
                    ChatMessage::system(
                        "Classify the emotion of this reply as one word from: happy, sad, angry, \
                         surprised, disgusted, scared, neutral, funny, cute, confused, excited, \
                         tired, love.",
                    ),
                    ChatMessage::user(reply_text),
                ],
                tools: vec![],
                temperature: Some(0.0),
                max_tokens: Some(10),
            })
            .await;

        match result {
            Ok(response) => response
                .content
                .and_then(|t| t.trim().parse::<Emotion>().ok())
                .unwrap_or(Emotion::Neutral),
            Err(_) => Emotion::Neutral,
        }
    }
}

fn parse_description(text: &str) -> Option<(String, Emotion)> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;
    let description = value.get("description")?.as_str()?.to_string();
    let emotion = value
        .get("emotion")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Emotion>().ok())
        .unwrap_or(Emotion::Neutral);
    Some((description, emotion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_description_extracts_embedded_json() {
        let text = "result: {\"description\":\"a cat waving\",\"emotion\":\"happy\"} ok";
        let (desc, emotion) = parse_description(text).unwrap();
        assert_eq!(desc, "a cat waving");
        assert_eq!(emotion, Emotion::Happy);
    }

    #[test]
    fn parse_description_falls_back_to_neutral_on_bad_emotion() {
        let text = "{\"description\":\"x\",\"emotion\":\"sideways\"}";
        let (_, emotion) = parse_description(text).unwrap();
        assert_eq!(emotion, Emotion::Neutral);
    }
}
