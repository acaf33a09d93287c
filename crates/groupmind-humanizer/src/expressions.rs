//! Expression Learner — distills per-user speaking habits from a batch of
//! inbound messages.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::warn;

pub use groupmind_core::config::ExpressionConfig;
use groupmind_core::types::{SessionId, UserId};
use groupmind_llm::{ChatMessage, CompletionRequest, LlmClient};
use groupmind_store::Store;

const BATCH_SIZE: usize = 30;
const MIN_MESSAGES_PER_USER: usize = 3;

#[derive(Clone)]
struct PendingMessage {
    user_id: UserId,
    user_name: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct Habit {
    situation: String,
    style: String,
    example: String,
}

/// Buffers inbound user messages per session until a flush-worthy batch
/// accumulates, then asks the LLM to distill speaking habits per user.
pub struct ExpressionLearner {
    cfg: ExpressionConfig,
    buffers: DashMap<SessionId, Vec<PendingMessage>>,
}

impl ExpressionLearner {
    pub fn new(cfg: ExpressionConfig) -> Self {
        Self {
            cfg,
            buffers: DashMap::new(),
        }
    }

    /// Buffer one message; returns the drained batch once it reaches
    /// `BATCH_SIZE`, ready for `flush`.
    pub fn on_message(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        user_name: &str,
        content: &str,
    ) -> Option<Vec<()>> {
        if !self.cfg.enabled {
            return None;
        }
        let mut buffer = self.buffers.entry(session_id.clone()).or_default();
        buffer.push(PendingMessage {
            user_id,
            user_name: user_name.to_string(),
            content: content.to_string(),
        });
        if buffer.len() >= BATCH_SIZE {
            Some(vec![(); buffer.len()])
        } else {
            None
        }
    }

    /// Drain and analyze the buffered batch for a session. No-op if the
    /// buffer hasn't reached `BATCH_SIZE`. Failures are logged and
    /// swallowed.
    pub async fn flush(&self, llm: &dyn LlmClient, model: &str, store: Arc<Store>, session_id: &SessionId) {
        let batch = {
            let mut entry = match self.buffers.get_mut(session_id) {
                Some(e) => e,
                None => return,
            };
            if entry.len() < BATCH_SIZE {
                return;
            }
            std::mem::take(&mut *entry)
        };

        if let Err(e) = self.analyze_batch(llm, model, store, session_id, batch).await {
            warn!(session_id = %session_id, error = %e, "expression learner failed");
        }
    }

    async fn analyze_batch(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        store: Arc<Store>,
        session_id: &SessionId,
        batch: Vec<PendingMessage>,
    ) -> crate::error::Result<()> {
        let mut by_user: HashMap<UserId, Vec<&PendingMessage>> = HashMap::new();
        for msg in &batch {
            by_user.entry(msg.user_id).or_default().push(msg);
        }

        for (user_id, messages) in by_user {
            if messages.len() < MIN_MESSAGES_PER_USER {
                continue;
            }
            let user_name = messages[0].user_name.clone();
            let transcript = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");

            let response = llm
                .complete(CompletionRequest {
                    model: model.to_string(),
                    messages: vec![
                        ChatMessage::system(
                            "Identify 2-4 distinctive speaking habits for this user from their \
                             messages. Reply with JSON: [{\"situation\",\"style\",\"example\"}]",
                        ),
                        ChatMessage::user(transcript),
                    ],
                    tools: vec![],
                    temperature: Some(0.4),
                    max_tokens: Some(500),
                })
                .await?;

            let text = response.content.unwrap_or_default();
            let habits: Vec<Habit> = match extract_and_parse(&text) {
                Some(h) => h,
                None => continue,
            };

            for habit in habits {
                store.save_expression(
                    session_id,
                    user_id,
                    &user_name,
                    &habit.situation,
                    &habit.style,
                    &habit.example,
                )?;
            }

            let count = store.get_expression_count(session_id)?;
            if count > self.cfg.max_expressions {
                store.delete_oldest_expressions(session_id, self.cfg.max_expressions)?;
            }
        }
        Ok(())
    }

    /// Sample `sample_size` expressions from the latest `3 * sample_size`
    /// rows and render them as a bullet list for prompt injection.
    pub fn get_expression_context(&self, store: &Store, session_id: &SessionId) -> crate::error::Result<String> {
        let pool_size = self.cfg.sample_size * 3;
        let mut rows = store.get_expressions(session_id, pool_size)?;
        if rows.is_empty() {
            return Ok(String::new());
        }

        let mut rng = rand::thread_rng();
        rows.shuffle(&mut rng);
        rows.truncate(self.cfg.sample_size);

        let mut out = String::new();
        for row in &rows {
            out.push_str(&format!("- {} ({}): \"{}\"\n", row.user_name, row.situation, row.example));
        }
        Ok(out)
    }
}

fn extract_and_parse(text: &str) -> Option<Vec<Habit>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_message_returns_batch_marker_once_threshold_reached() {
        let learner = ExpressionLearner::new(ExpressionConfig::default());
        let id = SessionId::group(1);
        for i in 0..(BATCH_SIZE - 1) {
            assert!(learner.on_message(&id, 1, "alice", &format!("msg {i}")).is_none());
        }
        assert!(learner.on_message(&id, 1, "alice", "final").is_some());
    }

    #[test]
    fn on_message_is_noop_when_disabled() {
        let learner = ExpressionLearner::new(ExpressionConfig {
            enabled: false,
            ..ExpressionConfig::default()
        });
        let id = SessionId::group(1);
        for i in 0..BATCH_SIZE + 5 {
            assert!(learner.on_message(&id, 1, "alice", &format!("msg {i}")).is_none());
        }
    }

    #[test]
    fn extract_and_parse_finds_embedded_array() {
        let text = "sure, here: [{\"situation\":\"s\",\"style\":\"st\",\"example\":\"e\"}] done";
        let habits = extract_and_parse(text).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].situation, "s");
    }
}
