//! Topic Tracker — periodically summarizes what a session has been
//! discussing.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::warn;

pub use groupmind_core::config::TopicConfig;
use groupmind_core::types::SessionId;
use groupmind_llm::{ChatMessage, CompletionRequest, LlmClient};
use groupmind_store::Store;

const RECENT_MESSAGE_LIMIT: usize = 80;
const EXISTING_TITLE_LIMIT: usize = 20;
/// Floor below which a batch never triggers analysis on elapsed time alone.
const TIME_TRIGGER_FLOOR: u32 = 15;
const JACCARD_MATCH_THRESHOLD: f64 = 0.7;

struct Counter {
    messages_since_check: u32,
    last_check_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TopicAnalysis {
    topics: Vec<TopicCandidate>,
}

#[derive(Debug, Deserialize)]
struct TopicCandidate {
    title: String,
    #[serde(default)]
    keywords: Vec<String>,
    summary: String,
}

/// Tracks per-session message counters and drives LLM topic analysis when
/// a session crosses its trigger threshold.
pub struct TopicTracker {
    cfg: TopicConfig,
    counters: DashMap<SessionId, Counter>,
}

impl TopicTracker {
    pub fn new(cfg: TopicConfig) -> Self {
        Self {
            cfg,
            counters: DashMap::new(),
        }
    }

    /// Record an inbound message and report whether analysis should run now.
    pub fn on_message(&self, session_id: &SessionId) -> bool {
        if !self.cfg.enabled {
            return false;
        }

        let now = Utc::now();
        let mut counter = self.counters.entry(session_id.clone()).or_insert_with(|| Counter {
            messages_since_check: 0,
            last_check_time: now,
        });
        counter.messages_since_check += 1;

        let elapsed_ms = now.signed_duration_since(counter.last_check_time).num_milliseconds();
        let due = counter.messages_since_check >= self.cfg.message_threshold
            || (elapsed_ms > self.cfg.time_threshold_ms as i64 && counter.messages_since_check >= TIME_TRIGGER_FLOOR);

        if due {
            let batch_size = counter.messages_since_check;
            counter.messages_since_check = 0;
            counter.last_check_time = now;
            drop(counter);
            return batch_size > 0;
        }
        false
    }

    /// Run analysis: load recent messages + existing titles, ask the LLM
    /// for a topic list, then upsert each into the store. Failures are
    /// logged and swallowed — topic tracking never fails a chat turn.
    pub async fn analyze(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        store: Arc<Store>,
        session_id: &SessionId,
        batch_size: u32,
    ) {
        if let Err(e) = self.analyze_inner(llm, model, store, session_id, batch_size).await {
            warn!(session_id = %session_id, error = %e, "topic analysis failed");
        }
    }

    async fn analyze_inner(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        store: Arc<Store>,
        session_id: &SessionId,
        batch_size: u32,
    ) -> crate::error::Result<()> {
        let messages = store.get_messages(session_id, RECENT_MESSAGE_LIMIT, None)?;
        let existing = store.get_topics(session_id, EXISTING_TITLE_LIMIT)?;
        let existing_titles: Vec<&str> = existing.iter().map(|t| t.title.as_str()).collect();

        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.user_name.as_deref().unwrap_or("bot"), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Existing topics: {}\n\nRecent conversation:\n{}\n\n\
             Return JSON: {{\"topics\":[{{\"title\",\"keywords\":[],\"summary\",\"is_continuation\"}}]}}",
            existing_titles.join(", "),
            transcript,
        );

        let response = llm
            .complete(CompletionRequest {
                model: model.to_string(),
                messages: vec![
                    ChatMessage::system("Extract discussion topics as JSON. Output JSON only."),
                    ChatMessage::user(prompt),
                ],
                tools: vec![],
                temperature: Some(0.3),
                max_tokens: Some(800),
            })
            .await?;

        let text = response.content.unwrap_or_default();
        let analysis: TopicAnalysis = match extract_and_parse(&text) {
            Some(a) => a,
            None => return Ok(()),
        };

        for candidate in analysis.topics {
            let matched = existing.iter().find(|t| {
                t.title == candidate.title || jaccard_similarity(&t.title, &candidate.title) > JACCARD_MATCH_THRESHOLD
            });

            match matched {
                Some(existing_topic) => {
                    store.update_topic(existing_topic.id, &candidate.summary, batch_size)?;
                }
                None => {
                    store.save_topic(session_id, &candidate.title, &candidate.keywords, &candidate.summary)?;
                }
            }
        }

        store.trim_topics(session_id, self.cfg.max_topics_per_session)?;
        Ok(())
    }
}

fn extract_and_parse(text: &str) -> Option<TopicAnalysis> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    serde_json::from_str(&text[start..=end]).ok()
}

/// Character-set Jaccard similarity between two titles.
fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = a.chars().collect();
    let set_b: HashSet<char> = b.chars().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_message_triggers_at_threshold() {
        let tracker = TopicTracker::new(TopicConfig {
            enabled: true,
            message_threshold: 3,
            time_threshold_ms: u64::MAX,
            max_topics_per_session: 20,
        });
        let id = SessionId::group(1);
        assert!(!tracker.on_message(&id));
        assert!(!tracker.on_message(&id));
        assert!(tracker.on_message(&id));
    }

    #[test]
    fn on_message_is_noop_when_disabled() {
        let tracker = TopicTracker::new(TopicConfig {
            enabled: false,
            ..TopicConfig::default()
        });
        let id = SessionId::group(1);
        for _ in 0..100 {
            assert!(!tracker.on_message(&id));
        }
    }

    #[test]
    fn jaccard_similarity_identical_strings_is_one() {
        assert_eq!(jaccard_similarity("rust async", "rust async"), 1.0);
    }

    #[test]
    fn jaccard_similarity_disjoint_strings_is_zero() {
        assert_eq!(jaccard_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn extract_and_parse_finds_embedded_json() {
        let text = "here is the result: {\"topics\":[]} thanks";
        let parsed = extract_and_parse(text).unwrap();
        assert!(parsed.topics.is_empty());
    }
}
