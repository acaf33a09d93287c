//! Action Planner — a pure-advisory gate consulted before the bot commits to
//! replying.

use std::collections::VecDeque;

use dashmap::DashMap;
use serde::Deserialize;

use groupmind_core::types::SessionId;
use groupmind_llm::{ChatMessage, CompletionRequest, LlmClient};

use crate::error::Result;

const DECISION_LOG_CAP: usize = 20;
const RECENT_DECISIONS_IN_PROMPT: usize = 5;
const WAIT_SECONDS_MIN: u64 = 10;
const WAIT_SECONDS_MAX: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Reply,
    Wait,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
    pub wait_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    action: Action,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    wait_seconds: Option<u64>,
}

/// Consults the LLM before every trigger that isn't an unambiguous direct
/// mention, and remembers its own recent verdicts per session.
pub struct ActionPlanner {
    logs: DashMap<SessionId, VecDeque<Decision>>,
}

impl ActionPlanner {
    pub fn new() -> Self {
        Self { logs: DashMap::new() }
    }

    pub async fn decide(
        &self,
        llm: &dyn LlmClient,
        model: &str,
        session_id: &SessionId,
        bot_nickname: &str,
        history: &[ChatMessage],
        trigger_text: &str,
    ) -> Result<Decision> {
        let recent_history: Vec<&ChatMessage> = history.iter().rev().take(20).collect();
        let transcript = recent_history
            .iter()
            .rev()
            .map(|m| format!("{:?}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        let past_decisions = self
            .logs
            .get(session_id)
            .map(|log| {
                log.iter()
                    .rev()
                    .take(RECENT_DECISIONS_IN_PROMPT)
                    .map(|d| format!("{:?}: {}", d.action, d.reason))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();

        let prompt = format!(
            "Bot nickname: {bot_nickname}\n\
             Recent conversation:\n{transcript}\n\n\
             Latest trigger: {trigger_text}\n\
             Past planner decisions: {past_decisions}\n\n\
             Decide whether the bot should reply now, wait, or consider the exchange \
             complete. Return JSON only: {{\"action\":\"reply|wait|complete\",\"reason\",\"wait_seconds\"}}"
        );

        let response = llm
            .complete(CompletionRequest {
                model: model.to_string(),
                messages: vec![
                    ChatMessage::system(
                        "You are a conversational timing planner. Output JSON only, no prose.",
                    ),
                    ChatMessage::user(prompt),
                ],
                tools: vec![],
                temperature: Some(0.1),
                max_tokens: Some(150),
            })
            .await?;

        let text = response.content.unwrap_or_default();
        let raw = parse_with_recovery(&text).unwrap_or(RawDecision {
            action: Action::Reply,
            reason: "planner output unparseable, defaulting to reply".to_string(),
            wait_seconds: None,
        });

        let wait_ms = raw
            .wait_seconds
            .map(|s| s.clamp(WAIT_SECONDS_MIN, WAIT_SECONDS_MAX) * 1000);

        let decision = Decision {
            action: raw.action,
            reason: raw.reason,
            wait_ms,
        };

        self.record(session_id, decision.clone());
        Ok(decision)
    }

    fn record(&self, session_id: &SessionId, decision: Decision) {
        let mut log = self.logs.entry(session_id.clone()).or_default();
        log.push_back(decision);
        while log.len() > DECISION_LOG_CAP {
            log.pop_front();
        }
    }
}

impl Default for ActionPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Decision {
    fn clone(&self) -> Self {
        Self {
            action: self.action,
            reason: self.reason.clone(),
            wait_ms: self.wait_ms,
        }
    }
}

/// Extract the first `{...}` substring and parse it; on failure strip
/// trailing commas before a closing brace/bracket and retry once.
fn parse_with_recovery(text: &str) -> Option<RawDecision> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    let candidate = &text[start..=end];

    if let Ok(decision) = serde_json::from_str(candidate) {
        return Some(decision);
    }

    let cleaned = strip_trailing_commas(candidate);
    serde_json::from_str(&cleaned).ok()
}

fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_recovery_handles_clean_json() {
        let text = r#"{"action":"wait","reason":"letting them finish","wait_seconds":30}"#;
        let raw = parse_with_recovery(text).unwrap();
        assert_eq!(raw.action, Action::Wait);
        assert_eq!(raw.wait_seconds, Some(30));
    }

    #[test]
    fn parse_with_recovery_strips_trailing_comma() {
        let text = r#"sure: {"action":"reply","reason":"direct question",}"#;
        let raw = parse_with_recovery(text).unwrap();
        assert_eq!(raw.action, Action::Reply);
    }

    #[test]
    fn parse_with_recovery_returns_none_on_garbage() {
        assert!(parse_with_recovery("not json at all").is_none());
    }

    #[test]
    fn decision_log_is_capped() {
        let planner = ActionPlanner::new();
        let id = SessionId::group(1);
        for i in 0..30 {
            planner.record(
                &id,
                Decision {
                    action: Action::Wait,
                    reason: format!("decision {i}"),
                    wait_ms: None,
                },
            );
        }
        assert_eq!(planner.logs.get(&id).unwrap().len(), DECISION_LOG_CAP);
    }
}
