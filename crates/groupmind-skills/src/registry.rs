use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use groupmind_core::types::SessionId;
use groupmind_llm::Tool;

use crate::error::{Result, SkillError};
use crate::types::{QualifiedTool, Skill, SkillSession};

/// Session-loaded skills expire 1 hour after `load_skill`.
const SESSION_TTL: chrono::Duration = chrono::Duration::hours(1);
/// How often the background sweep purges expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Process-wide catalog of skills, plus the per-session set of skills
/// each conversation currently has loaded.
pub struct SkillRegistry {
    skills: DashMap<String, Arc<Skill>>,
    sessions: DashMap<SessionId, DashMap<String, SkillSession>>,
}

impl SkillRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            skills: DashMap::new(),
            sessions: DashMap::new(),
        })
    }

    /// Register a skill process-wide. Overwrites any existing skill of the
    /// same name.
    pub fn register(&self, skill: Skill) {
        self.skills.insert(skill.name.clone(), Arc::new(skill));
    }

    pub fn known_skills(&self) -> Vec<Arc<Skill>> {
        self.skills.iter().map(|e| Arc::clone(e.value())).collect()
    }

    /// Copy a registered skill's tools into the session's loaded-skill map
    /// under `skill_name.tool_name` keys, with a fresh 1h TTL.
    #[instrument(skip(self), fields(session_id = %session_id, skill_name))]
    pub fn load_skill(&self, session_id: &SessionId, skill_name: &str) -> Result<()> {
        let skill = self
            .skills
            .get(skill_name)
            .ok_or_else(|| SkillError::NotFound(skill_name.to_string()))?;

        let now = Utc::now();
        let mut tools: std::collections::HashMap<String, Arc<dyn Tool>> = std::collections::HashMap::new();
        for tool in &skill.tools {
            let qualified: Arc<dyn Tool> = Arc::new(QualifiedTool::new(skill_name, Arc::clone(tool)));
            tools.insert(qualified.name().to_string(), qualified);
        }

        let session_skills = self.sessions.entry(session_id.clone()).or_default();
        session_skills.insert(
            skill_name.to_string(),
            SkillSession {
                skill_name: skill_name.to_string(),
                tools,
                loaded_at: now,
                expires_at: now + SESSION_TTL,
            },
        );
        Ok(())
    }

    /// All non-expired tools currently loaded for a session. Expired
    /// entries are dropped lazily as part of this call.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn get_tools(&self, session_id: &SessionId) -> Vec<Arc<dyn Tool>> {
        let now = Utc::now();
        let Some(session_skills) = self.sessions.get(session_id) else {
            return Vec::new();
        };

        session_skills.retain(|_, s| !s.is_expired(now));
        session_skills
            .iter()
            .flat_map(|e| e.value().tools.values().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Non-expired loaded skills for a session, as `(skill_name,
    /// tool_names)` pairs, for the prompt builder's "loaded-skills"
    /// listing. Expired entries are dropped lazily as part
    /// of this call, same as [`Self::get_tools`].
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn loaded_skills(&self, session_id: &SessionId) -> Vec<(String, Vec<String>)> {
        let now = Utc::now();
        let Some(session_skills) = self.sessions.get(session_id) else {
            return Vec::new();
        };

        session_skills.retain(|_, s| !s.is_expired(now));
        session_skills
            .iter()
            .map(|e| {
                let tool_names = e.value().tools.values().map(|t| t.name().to_string()).collect();
                (e.value().skill_name.clone(), tool_names)
            })
            .collect()
    }

    #[instrument(skip(self), fields(session_id = %session_id, skill_name))]
    pub fn unload_skill(&self, session_id: &SessionId, skill_name: &str) {
        if let Some(session_skills) = self.sessions.get(session_id) {
            session_skills.remove(skill_name);
        }
    }

    /// Purge every expired entry and any session map left empty by doing so.
    fn sweep(&self) {
        let now = Utc::now();
        for entry in self.sessions.iter() {
            entry.value().retain(|_, s| !s.is_expired(now));
        }
        self.sessions.retain(|_, skills| !skills.is_empty());
        debug!("skill registry sweep complete");
    }

    pub fn spawn_sweep(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => registry.sweep(),
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("skill registry sweep loop shutting down");
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
    use async_trait::async_trait;
    use groupmind_llm::ToolResult;

    use super::*;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn return_to_ai(&self) -> bool {
            true
        }
        async fn execute(&self, _input: serde_json::Value) -> ToolResult {
            ToolResult::success("ok")
        }
    }

    fn weather_skill() -> Skill {
        Skill {
            name: "weather".to_string(),
            description: "look up the weather".to_string(),
            tools: vec![Arc::new(EchoTool("lookup"))],
        }
    }

    #[test]
    fn load_skill_exposes_fully_qualified_tool_names() {
        let registry = SkillRegistry::new();
        registry.register(weather_skill());
        let session = SessionId::group(1);

        registry.load_skill(&session, "weather").unwrap();
        let tools = registry.get_tools(&session);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "weather.lookup");
    }

    #[test]
    fn load_skill_fails_for_unknown_name() {
        let registry = SkillRegistry::new();
        let session = SessionId::group(1);
        assert!(registry.load_skill(&session, "nonexistent").is_err());
    }

    #[test]
    fn unload_skill_removes_its_tools() {
        let registry = SkillRegistry::new();
        registry.register(weather_skill());
        let session = SessionId::group(1);
        registry.load_skill(&session, "weather").unwrap();

        registry.unload_skill(&session, "weather");

        assert!(registry.get_tools(&session).is_empty());
    }

    #[test]
    fn sweep_drops_expired_session_entries() {
        let registry = SkillRegistry::new();
        registry.register(weather_skill());
        let session = SessionId::group(1);
        registry.load_skill(&session, "weather").unwrap();

        // Force immediate expiry by rewriting the TTL directly.
        if let Some(session_skills) = registry.sessions.get(&session) {
            if let Some(mut s) = session_skills.get_mut("weather") {
                s.expires_at = Utc::now() - chrono::Duration::seconds(1);
            }
        }

        registry.sweep();
        assert!(registry.sessions.is_empty());
    }
}
