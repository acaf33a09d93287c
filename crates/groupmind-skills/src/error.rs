use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("skill '{0}' is not registered")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SkillError>;
