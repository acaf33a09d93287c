use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use groupmind_llm::{Tool, ToolResult};

/// A named bundle of tools the dispatcher can load into a session.
pub struct Skill {
    pub name: String,
    pub description: String,
    pub tools: Vec<Arc<dyn Tool>>,
}

/// Wraps a skill's tool so it reports its fully-qualified
/// `skill_name.tool_name` to the model — keeps a session-loaded tool from
/// colliding with a same-named fixed tool or another loaded skill's tool.
pub struct QualifiedTool {
    qualified_name: String,
    inner: Arc<dyn Tool>,
}

impl QualifiedTool {
    pub fn new(skill_name: &str, inner: Arc<dyn Tool>) -> Self {
        Self {
            qualified_name: format!("{skill_name}.{}", inner.name()),
            inner,
        }
    }
}

#[async_trait]
impl Tool for QualifiedTool {
    fn name(&self) -> &str {
        &self.qualified_name
    }
    fn description(&self) -> &str {
        self.inner.description()
    }
    fn parameters(&self) -> serde_json::Value {
        self.inner.parameters()
    }
    fn return_to_ai(&self) -> bool {
        self.inner.return_to_ai()
    }
    async fn execute(&self, input: serde_json::Value) -> ToolResult {
        self.inner.execute(input).await
    }
}

/// A skill loaded into one session, with a TTL from the moment it was
/// loaded.
pub struct SkillSession {
    pub skill_name: String,
    /// Keyed by fully-qualified `skill_name.tool_name`.
    pub tools: HashMap<String, Arc<dyn Tool>>,
    pub loaded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SkillSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
