use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolsError {
    #[error("skill error: {0}")]
    Skill(#[from] groupmind_skills::SkillError),
}

pub type Result<T> = std::result::Result<T, ToolsError>;
